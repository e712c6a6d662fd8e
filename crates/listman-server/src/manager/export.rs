//! CSV export of a list's contacts.

use chrono::NaiveDate;

use listman_core::{Contact, ListId};

use crate::error::ApiError;

use super::ListManager;

/// Header row of every export.
pub const CSV_HEADER: &str = "ContactId,Identifier,FirstName,Surname,PreferredEmail";

/// A snapshot of a list's contacts ready to be written out as CSV.
#[derive(Debug, Clone)]
pub struct ContactExport {
    pub list_name: String,
    pub contacts: Vec<Contact>,
}

impl ContactExport {
    /// Download file name: `"<list name> <YYYY-MM-DD>.csv"`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{} {}.csv", self.list_name, date.format("%Y-%m-%d"))
    }

    /// CSV lines, header first, each terminated by CRLF.
    pub fn into_csv_rows(self) -> impl Iterator<Item = String> + Send + 'static {
        std::iter::once(format!("{}\r\n", CSV_HEADER)).chain(
            self.contacts.into_iter().map(|contact| {
                let fields = [
                    contact.id.to_string(),
                    contact.identifier,
                    contact.first_name,
                    contact.surname,
                    contact.preferred_email,
                ];
                let mut line = fields
                    .iter()
                    .map(|f| escape_field(f))
                    .collect::<Vec<_>>()
                    .join(",");
                line.push_str("\r\n");
                line
            }),
        )
    }
}

/// Quotes a field when it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl ListManager {
    /// Collects the list's contacts for export. Exporting never checks locks.
    pub fn export_contacts(&self, list_id: ListId) -> Result<ContactExport, ApiError> {
        let list = self.get_list(list_id)?;
        let contacts: Vec<Contact> = self.get_contacts(list_id)?.collect();
        tracing::info!(%list_id, contacts = contacts.len(), "list exported");
        Ok(ContactExport {
            list_name: list.name,
            contacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{manager, payload, static_list};
    use super::*;
    use listman_core::ContactId;

    fn contact(first_name: &str) -> Contact {
        Contact {
            id: ContactId::new(),
            identifier: "jdoe".into(),
            first_name: first_name.into(),
            surname: "Doe".into(),
            preferred_email: "jdoe@example.com".into(),
        }
    }

    #[test]
    fn file_name_uses_iso_date() {
        let export = ContactExport {
            list_name: "VIP".into(),
            contacts: vec![],
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export.file_name(date), "VIP 2024-03-09.csv");
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let c = contact("Jane, \"JJ\"");
        let id = c.id;
        let rows: Vec<_> = ContactExport {
            list_name: "VIP".into(),
            contacts: vec![c],
        }
        .into_csv_rows()
        .collect();

        assert_eq!(rows[0], format!("{CSV_HEADER}\r\n"));
        assert_eq!(
            rows[1],
            format!("{id},jdoe,\"Jane, \"\"JJ\"\"\",Doe,jdoe@example.com\r\n")
        );
    }

    #[test]
    fn export_skips_duplicate_rows_and_ignores_locks() {
        let mut m = manager();
        let list = static_list(&mut m, "VIP");
        m.associate_contacts(list, &[payload("a"), payload("b")])
            .unwrap();
        let first = m.get_contacts(list).unwrap().next().unwrap();
        m.store.insert_association(list, first.id).unwrap();
        m.lock_manager().acquire(list, None).unwrap();

        let export = m.export_contacts(list).unwrap();
        assert_eq!(export.list_name, "VIP");
        assert_eq!(export.into_csv_rows().count(), 3);
    }

    #[test]
    fn empty_list_exports_header_only() {
        let mut m = manager();
        let list = static_list(&mut m, "Empty");
        let rows: Vec<_> = m.export_contacts(list).unwrap().into_csv_rows().collect();
        assert_eq!(rows, vec![format!("{CSV_HEADER}\r\n")]);
    }
}
