//! SQLite implementation of [`ListStore`].
//!
//! [`SqliteStore`] persists list data in a SQLite database with WAL mode,
//! transactions on multi-statement writes, and automatic schema migrations.
//! IDs are stored as hyphenated UUID TEXT; a list's source descriptor is a
//! JSON TEXT column via serde_json.

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use listman_core::{
    Contact, ContactId, ContactList, Folder, FolderId, ListId, ListKind, ListSource,
};

use crate::error::StorageError;
use crate::traits::ListStore;

/// SQLite-backed implementation of [`ListStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn kind_to_str(kind: ListKind) -> &'static str {
        match kind {
            ListKind::Static => "static",
            ListKind::Segmented => "segmented",
        }
    }

    fn str_to_kind(s: &str) -> ListKind {
        match s {
            "segmented" => ListKind::Segmented,
            _ => ListKind::Static,
        }
    }

}

fn folder_exists(conn: &Connection, id: FolderId) -> Result<bool, StorageError> {
    exists(conn, "SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?1)", id.to_string())
}

fn ensure_folder(conn: &Connection, id: Option<FolderId>) -> Result<(), StorageError> {
    match id {
        Some(id) if !folder_exists(conn, id)? => Err(StorageError::FolderNotFound(id)),
        _ => Ok(()),
    }
}

fn exists(conn: &Connection, sql: &str, id: String) -> Result<bool, StorageError> {
    Ok(conn.query_row(sql, params![id], |row| row.get(0))?)
}

// Row writers take a plain `Connection` so they run unchanged inside a
// `Transaction` (which derefs to one).

fn insert_list_row(conn: &Connection, list: &ContactList) -> Result<(), StorageError> {
    ensure_folder(conn, list.folder)?;
    let source_json = serde_json::to_string(&list.source)?;
    conn.execute(
        "INSERT INTO contact_lists (id, name, folder_id, kind, source_json) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            list.id.to_string(),
            list.name,
            list.folder.map(|f| f.to_string()),
            SqliteStore::kind_to_str(list.kind),
            source_json,
        ],
    )?;
    Ok(())
}

fn delete_list_rows(conn: &Connection, id: ListId) -> Result<bool, StorageError> {
    conn.execute(
        "DELETE FROM associations WHERE list_id = ?1",
        params![id.to_string()],
    )?;
    let removed = conn.execute(
        "DELETE FROM contact_lists WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(removed > 0)
}

fn delete_folder_row(conn: &Connection, id: FolderId) -> Result<(), StorageError> {
    if !folder_exists(conn, id)? {
        return Err(StorageError::FolderNotFound(id));
    }
    let has_children: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM folders WHERE parent_id = ?1)
             OR EXISTS(SELECT 1 FROM contact_lists WHERE folder_id = ?1)",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    if has_children {
        return Err(StorageError::IntegrityError {
            reason: format!("folder {} is not empty", id),
        });
    }
    conn.execute("DELETE FROM folders WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

fn insert_association_row(
    conn: &Connection,
    list: ListId,
    contact: ContactId,
) -> Result<(), StorageError> {
    if !exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM contact_lists WHERE id = ?1)",
        list.to_string(),
    )? {
        return Err(StorageError::ListNotFound(list));
    }
    if !exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1)",
        contact.to_string(),
    )? {
        return Err(StorageError::ContactNotFound(contact));
    }
    conn.execute(
        "INSERT INTO associations (list_id, contact_id) VALUES (?1, ?2)",
        params![list.to_string(), contact.to_string()],
    )?;
    Ok(())
}

/// Reads a UUID stored as TEXT.
fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Uuid::parse_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn folder_from_row(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: FolderId(uuid_at(row, 0)?),
        name: row.get(1)?,
        parent: opt_uuid_at(row, 2)?.map(FolderId),
    })
}

/// Raw list row; the source JSON is decoded outside the rusqlite closure so
/// serde errors surface as [`StorageError::Serialization`].
struct ListRow {
    id: ListId,
    name: String,
    folder: Option<FolderId>,
    kind: String,
    source_json: String,
}

impl ListRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ListRow {
            id: ListId(uuid_at(row, 0)?),
            name: row.get(1)?,
            folder: opt_uuid_at(row, 2)?.map(FolderId),
            kind: row.get(3)?,
            source_json: row.get(4)?,
        })
    }

    fn into_list(self) -> Result<ContactList, StorageError> {
        let source: ListSource = serde_json::from_str(&self.source_json)?;
        Ok(ContactList {
            id: self.id,
            name: self.name,
            folder: self.folder,
            kind: SqliteStore::str_to_kind(&self.kind),
            source,
        })
    }
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: ContactId(uuid_at(row, 0)?),
        identifier: row.get(1)?,
        first_name: row.get(2)?,
        surname: row.get(3)?,
        preferred_email: row.get(4)?,
    })
}

const LIST_COLUMNS: &str = "id, name, folder_id, kind, source_json";
const CONTACT_COLUMNS: &str = "id, identifier, first_name, surname, preferred_email";

impl ListStore for SqliteStore {
    fn insert_folder(&mut self, folder: &Folder) -> Result<(), StorageError> {
        ensure_folder(&self.conn, folder.parent)?;
        self.conn.execute(
            "INSERT INTO folders (id, name, parent_id) VALUES (?1, ?2, ?3)",
            params![
                folder.id.to_string(),
                folder.name,
                folder.parent.map(|p| p.to_string())
            ],
        )?;
        Ok(())
    }

    fn find_folder(&self, id: FolderId) -> Result<Option<Folder>, StorageError> {
        let folder = self
            .conn
            .query_row(
                "SELECT id, name, parent_id FROM folders WHERE id = ?1",
                params![id.to_string()],
                folder_from_row,
            )
            .optional()?;
        Ok(folder)
    }

    fn update_folder(&mut self, folder: &Folder) -> Result<(), StorageError> {
        ensure_folder(&self.conn, folder.parent)?;
        let changed = self.conn.execute(
            "UPDATE folders SET name = ?2, parent_id = ?3 WHERE id = ?1",
            params![
                folder.id.to_string(),
                folder.name,
                folder.parent.map(|p| p.to_string())
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::FolderNotFound(folder.id));
        }
        Ok(())
    }

    fn delete_folder(&mut self, id: FolderId) -> Result<(), StorageError> {
        delete_folder_row(&self.conn, id)
    }

    fn child_folders(&self, parent: Option<FolderId>) -> Result<Vec<Folder>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, parent_id FROM folders WHERE parent_id IS ?1 ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(params![parent.map(|p| p.to_string())], folder_from_row)?;
        let mut folders = Vec::new();
        for row in rows {
            folders.push(row?);
        }
        Ok(folders)
    }

    fn insert_list(&mut self, list: &ContactList) -> Result<(), StorageError> {
        insert_list_row(&self.conn, list)
    }

    fn find_list(&self, id: ListId) -> Result<Option<ContactList>, StorageError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {LIST_COLUMNS} FROM contact_lists WHERE id = ?1"),
                params![id.to_string()],
                ListRow::from_row,
            )
            .optional()?;
        row.map(ListRow::into_list).transpose()
    }

    fn update_list(&mut self, list: &ContactList) -> Result<(), StorageError> {
        ensure_folder(&self.conn, list.folder)?;
        let source_json = serde_json::to_string(&list.source)?;
        let changed = self.conn.execute(
            "UPDATE contact_lists SET name = ?2, folder_id = ?3, kind = ?4, source_json = ?5 WHERE id = ?1",
            params![
                list.id.to_string(),
                list.name,
                list.folder.map(|f| f.to_string()),
                Self::kind_to_str(list.kind),
                source_json,
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::ListNotFound(list.id));
        }
        Ok(())
    }

    fn delete_list(&mut self, id: ListId) -> Result<bool, StorageError> {
        let tx = self.conn.transaction()?;
        let removed = delete_list_rows(&tx, id)?;
        tx.commit()?;
        Ok(removed)
    }

    fn delete_tree(&mut self, lists: &[ListId], folders: &[FolderId]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for list in lists {
            delete_list_rows(&tx, *list)?;
        }
        for folder in folders {
            delete_folder_row(&tx, *folder)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn lists_in_folder(&self, folder: Option<FolderId>) -> Result<Vec<ContactList>, StorageError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {LIST_COLUMNS} FROM contact_lists WHERE folder_id IS ?1 ORDER BY name COLLATE NOCASE"
        ))?;
        let rows = stmt.query_map(params![folder.map(|f| f.to_string())], ListRow::from_row)?;
        let mut lists = Vec::new();
        for row in rows {
            lists.push(row?.into_list()?);
        }
        Ok(lists)
    }

    fn insert_contact(&mut self, contact: &Contact) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO contacts (id, identifier, first_name, surname, preferred_email) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                contact.id.to_string(),
                contact.identifier,
                contact.first_name,
                contact.surname,
                contact.preferred_email,
            ],
        )?;
        Ok(())
    }

    fn find_contact(&self, id: ContactId) -> Result<Option<Contact>, StorageError> {
        let contact = self
            .conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id.to_string()],
                contact_from_row,
            )
            .optional()?;
        Ok(contact)
    }

    fn find_contact_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Contact>, StorageError> {
        let contact = self
            .conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE identifier = ?1 LIMIT 1"),
                params![identifier],
                contact_from_row,
            )
            .optional()?;
        Ok(contact)
    }

    fn insert_association(
        &mut self,
        list: ListId,
        contact: ContactId,
    ) -> Result<(), StorageError> {
        insert_association_row(&self.conn, list, contact)
    }

    fn insert_list_with_associations(
        &mut self,
        list: &ContactList,
        contacts: &[ContactId],
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        insert_list_row(&tx, list)?;
        for contact in contacts {
            insert_association_row(&tx, list.id, *contact)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn list_associations(&self, list: ListId) -> Result<Vec<ContactId>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT contact_id FROM associations WHERE list_id = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![list.to_string()], |row| uuid_at(row, 0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(ContactId(row?));
        }
        Ok(ids)
    }

    fn delete_associations(
        &mut self,
        list: ListId,
        contact: ContactId,
    ) -> Result<usize, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM associations WHERE list_id = ?1 AND contact_id = ?2",
            params![list.to_string(), contact.to_string()],
        )?;
        Ok(removed)
    }

    fn delete_all_associations(&mut self, list: ListId) -> Result<usize, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM associations WHERE list_id = ?1",
            params![list.to_string()],
        )?;
        Ok(removed)
    }

    fn replace_associations(
        &mut self,
        list: ListId,
        contacts: &[ContactId],
    ) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM associations WHERE list_id = ?1",
            params![list.to_string()],
        )?;
        for contact in contacts {
            insert_association_row(&tx, list, *contact)?;
        }
        tx.commit()?;
        Ok(removed)
    }
}
