// src/store/sql.rs

pub(super) const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS fsevents (
    file_path TEXT PRIMARY KEY,
    file_name TEXT NOT NULL,
    mode      TEXT NOT NULL,
    size      INTEGER
)";

pub(super) const DELETE_ALL: &str = "DELETE FROM fsevents";

pub(super) const INSERT: &str =
    "INSERT INTO fsevents (file_path, file_name, mode, size) VALUES (?1, ?2, ?3, ?4)";

pub(super) const UPDATE: &str = "UPDATE fsevents SET mode = ?1, size = ?2 WHERE file_path = ?3";

pub(super) const DELETE_ONE: &str = "DELETE FROM fsevents WHERE file_path = ?1";

pub(super) const SELECT_ONE: &str =
    "SELECT file_path, file_name, mode, size FROM fsevents WHERE file_path = ?1";

pub(super) const SELECT_ALL: &str =
    "SELECT file_path, file_name, mode, size FROM fsevents ORDER BY file_path";

pub(super) const COUNT: &str = "SELECT COUNT(*) FROM fsevents";
