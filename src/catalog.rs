use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::sync::{Arc, RwLock};

use log::info;

use crate::buffer_pool::BufferPool;
use crate::error::{DbError, DbResult};
use crate::heap_file::HeapFile;
use crate::tuple::TupleDesc;
use crate::types::Type::{IntType, StringType};

/// Registry mapping table names and file ids to their `HeapFile`s, holding
/// the buffer pool every table it creates is wired to.
pub struct Catalog {
    bp: Arc<BufferPool>,
    tables: RwLock<HashMap<String, Arc<HeapFile>>>,
    table_ids: RwLock<HashMap<usize, Arc<HeapFile>>>,
}

impl Catalog {
    pub fn new(bp: Arc<BufferPool>) -> Self {
        Catalog {
            bp,
            tables: RwLock::new(HashMap::new()),
            table_ids: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_table(&self, file: Arc<HeapFile>, name: String) {
        let file_id = file.get_id();
        self.tables.write().unwrap().insert(name, Arc::clone(&file));
        self.table_ids.write().unwrap().insert(file_id, file);
    }

    pub fn get_table_from_name(&self, name: &str) -> Option<Arc<HeapFile>> {
        self.tables.read().unwrap().get(name).cloned()
    }

    pub fn get_table_from_id(&self, id: usize) -> Option<Arc<HeapFile>> {
        self.table_ids.read().unwrap().get(&id).cloned()
    }

    pub fn get_tuple_desc(&self, table_id: usize) -> Option<TupleDesc> {
        self.get_table_from_id(table_id)
            .map(|t| t.get_tuple_desc().clone())
    }

    /// Load a schema file of lines shaped `table_name (field: Type, ...)`,
    /// opening or creating `data/{table_name}.dat` for each table named.
    pub fn load_schema(&self, schema_file_path: &str) -> DbResult<()> {
        let schema_file = File::open(schema_file_path)?;
        let reader = BufReader::new(schema_file);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let split_parens: Vec<&str> = line.split('(').collect();
            if split_parens.len() != 2 {
                return Err(DbError::MalformedData(format!("malformed schema line: {line}")));
            }
            let table_name = split_parens[0].replace(' ', "");
            let fields_part = split_parens[1].trim_end_matches(')');

            let mut field_types = vec![];
            let mut field_names = vec![];
            for field in fields_part.split(',') {
                let parts: Vec<&str> = field.split(':').collect();
                if parts.len() != 2 {
                    return Err(DbError::MalformedData(format!("malformed field spec: {field}")));
                }
                let field_name = parts[0].replace(' ', "");
                let field_type = match parts[1].replace(' ', "").as_str() {
                    "Int" => IntType,
                    "String" => StringType,
                    other => {
                        return Err(DbError::MalformedData(format!(
                            "unknown field type: {other}"
                        )))
                    }
                };
                field_names.push(field_name);
                field_types.push(field_type);
            }

            let field_count = field_names.len();
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .open(format!("data/{table_name}.dat"))?;
            let heap_file = HeapFile::new(file, TupleDesc::new(field_types, field_names), Arc::clone(&self.bp));
            info!("loaded table '{table_name}' ({field_count} fields)");
            self.add_table(heap_file, table_name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::sync::Mutex;

    // `load_schema` writes to a `data/` path relative to the process cwd, so
    // tests that exercise it must not run concurrently with each other.
    static CWD_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn load_schema_registers_tables() {
        let _guard = CWD_GUARD.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::env::set_current_dir(&dir).unwrap();
        std::fs::create_dir_all("data").unwrap();

        let schema_path = dir.path().join("schema.txt");
        let mut schema_file = File::create(&schema_path).unwrap();
        writeln!(schema_file, "people (id: Int, name: String)").unwrap();

        let catalog = Catalog::new(Arc::new(BufferPool::new()));
        catalog.load_schema(schema_path.to_str().unwrap()).unwrap();

        let table = catalog.get_table_from_name("people").unwrap();
        assert_eq!(table.get_tuple_desc().num_fields(), 2);
    }

    #[test]
    fn load_schema_rejects_unknown_type() {
        let _guard = CWD_GUARD.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::env::set_current_dir(&dir).unwrap();
        std::fs::create_dir_all("data").unwrap();

        let schema_path = dir.path().join("schema.txt");
        let mut schema_file = File::create(&schema_path).unwrap();
        writeln!(schema_file, "bad (id: Float)").unwrap();

        let catalog = Catalog::new(Arc::new(BufferPool::new()));
        assert!(matches!(
            catalog.load_schema(schema_path.to_str().unwrap()),
            Err(DbError::MalformedData(_))
        ));
    }
}
