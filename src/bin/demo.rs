//! Exercises the library end to end: registers a table, runs a few
//! concurrent inserting transactions (retrying on self-detected deadlock),
//! then scans and prints the result. Not a CLI — there is no argument
//! parsing or persistent configuration here, per the library's scope.

use std::thread;
use std::time::Duration;

use heapdb::database;
use heapdb::fields::{FieldVal, IntField, StringField};
use heapdb::heap_file::HeapFile;
use heapdb::transaction::TransactionId;
use heapdb::tuple::{Tuple, TupleDesc};
use heapdb::types::Type;

fn main() {
    env_logger::init();

    let db = database::get_global_db();
    let catalog = db.get_catalog();

    let data_dir = std::env::temp_dir().join(format!("heapdb-demo-{}", std::process::id()));
    std::fs::create_dir_all(&data_dir).expect("create demo data dir");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(data_dir.join("employees.dat"))
        .expect("open employees table file");

    let td = TupleDesc::new(
        vec![Type::IntType, Type::StringType],
        vec!["id".to_string(), "name".to_string()],
    );
    let heap_file = HeapFile::new(file, td.clone(), db.get_buffer_pool());
    let table_id = heap_file.get_id();
    catalog.add_table(heap_file, "employees".to_string());

    println!("table id: {table_id}");
    println!("table name: {:?}", td.field_name(0));

    let handles: Vec<_> = (0..3)
        .map(|worker| {
            let db = database::get_global_db();
            let td = td.clone();
            thread::spawn(move || loop {
                let tid = TransactionId::new();
                let bp = db.get_buffer_pool();
                let table = db.get_catalog().get_table_from_id(table_id).unwrap();
                let name = format!("Alice_{worker}_{tid}");

                let mut failed = false;
                for i in 0..3 {
                    let tuple = Tuple::new(
                        vec![
                            FieldVal::IntField(IntField::new(i)),
                            FieldVal::StringField(StringField::new(name.clone())),
                        ],
                        &td,
                    );
                    if table.insert_tuple(tid, tuple).is_err() {
                        failed = true;
                        break;
                    }
                }

                if failed {
                    bp.abort_transaction(tid);
                    println!("transaction {tid} aborted, retrying");
                    thread::sleep(Duration::from_millis(50));
                    continue;
                }
                if bp.commit_transaction(tid).is_ok() {
                    println!("transaction {tid} committed");
                    break;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    let tid = TransactionId::new();
    let table = catalog.get_table_from_id(table_id).unwrap();
    let mut tuple_count = 0;
    for tuple in table.iterator(tid) {
        match tuple {
            Ok(tuple) => {
                println!("tuple: {tuple}");
                tuple_count += 1;
            }
            Err(e) => {
                eprintln!("scan error: {e}");
                break;
            }
        }
    }
    let _ = db.get_buffer_pool().commit_transaction(tid);

    println!("tuple count: {tuple_count}");
}
