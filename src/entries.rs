//! Vault entries
//!
//! The canonical shape of an entry and the rules it has to satisfy before it reaches storage

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Maximum length of a name, in characters
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a message, in characters
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Kind of entry, used by the frontend for grouping and display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Plain note
    #[default]
    Note,

    /// Something to keep out of sight
    Secret,

    /// A link to somewhere
    Link,

    /// A code snippet
    Code,

    /// Something to do
    Todo,
}

impl EntryType {
    /// Every known entry type, in display order
    pub const ALL: [EntryType; 5] = [
        EntryType::Note,
        EntryType::Secret,
        EntryType::Link,
        EntryType::Code,
        EntryType::Todo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Note => "note",
            EntryType::Secret => "secret",
            EntryType::Link => "link",
            EntryType::Code => "code",
            EntryType::Todo => "todo",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given entry type is not one of [`EntryType::ALL`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownEntryType;

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EntryType::ALL
            .into_iter()
            .find(|entry_type| entry_type.as_str() == value)
            .ok_or(UnknownEntryType)
    }
}

/// Metadata of an attachment, embedded in its entry
///
/// Either all of it is there or the entry has no attachment at all
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Generated name in the content area
    pub filename: String,

    /// Name as uploaded by the client
    pub original_name: String,

    /// MIME type, without parameters
    pub mime_type: String,

    /// Size in bytes
    pub size: u64,

    /// Location in the content area
    pub path: String,
}

/// A stored vault entry
#[derive(Clone, Debug)]
pub struct Entry {
    /// Entry ID, assigned by storage
    pub id: Uuid,

    pub name: String,

    pub email: String,

    pub message: String,

    pub entry_type: EntryType,

    /// Optional attachment
    pub file: Option<FileDescriptor>,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Does the entry contain the (already lower-cased) needle?
    ///
    /// Looks at the name, the message and the type
    pub fn contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.message.to_lowercase().contains(needle)
            || self.entry_type.as_str().contains(needle)
    }
}

/// Raw entry values, straight from a request
#[derive(Clone, Debug, Default)]
pub struct EntryInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub entry_type: Option<String>,
}

/// Entry values that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidEntry {
    pub name: String,
    pub email: String,
    pub message: String,
    pub entry_type: EntryType,
}

impl EntryInput {
    /// Normalize and validate the input
    ///
    /// All failing fields are reported, one message per field
    pub fn validate(&self) -> Result<ValidEntry, Vec<String>> {
        let mut errors = Vec::new();

        let name = trimmed(self.name.as_deref());
        if name.is_empty() {
            errors.push("Name is required".to_string());
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push("Name too long".to_string());
        }

        let email = trimmed(self.email.as_deref()).to_lowercase();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !is_valid_email(&email) {
            errors.push("Invalid email format".to_string());
        }

        let message = trimmed(self.message.as_deref());
        if message.is_empty() {
            errors.push("Message is required".to_string());
        } else if message.chars().count() > MAX_MESSAGE_LENGTH {
            errors.push("Message too long".to_string());
        }

        let entry_type = parse_entry_type(self.entry_type.as_deref());
        if entry_type.is_err() {
            errors.push("Invalid entry type".to_string());
        }

        match entry_type {
            Ok(entry_type) if errors.is_empty() => Ok(ValidEntry {
                name: name.to_string(),
                email,
                message: message.to_string(),
                entry_type,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse an optional entry type, empty means the default type
pub fn parse_entry_type(value: Option<&str>) -> Result<EntryType, UnknownEntryType> {
    match value.map(str::trim) {
        None | Some("") => Ok(EntryType::default()),
        Some(value) => value.to_lowercase().parse(),
    }
}

/// Basic `local@domain.tld` shape check
///
/// Same as `^\S+@\S+\.\S+$`: no whitespace, something before an `@` and a dot with
/// something on both sides after it
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    email.match_indices('@').any(|(at, _)| {
        let domain = &email[at + 1..];

        at > 0
            && domain
                .match_indices('.')
                .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
    })
}

fn trimmed(value: Option<&str>) -> &str {
    value.map(str::trim).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, message: &str) -> EntryInput {
        EntryInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            entry_type: None,
        }
    }

    #[test]
    fn test_valid_input() {
        let entry = input("  Alice ", " A@B.com", "hello world\n")
            .validate()
            .unwrap();

        assert_eq!("Alice", entry.name);
        assert_eq!("a@b.com", entry.email);
        assert_eq!("hello world", entry.message);
        assert_eq!(EntryType::Note, entry.entry_type);
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let errors = EntryInput::default().validate().unwrap_err();

        assert_eq!(
            vec![
                "Name is required".to_string(),
                "Email is required".to_string(),
                "Message is required".to_string(),
            ],
            errors
        );
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let errors = input("   ", "a@b.com", "\t").validate().unwrap_err();

        assert_eq!(
            vec![
                "Name is required".to_string(),
                "Message is required".to_string(),
            ],
            errors
        );
    }

    #[test]
    fn test_length_bounds() {
        let name = "n".repeat(MAX_NAME_LENGTH);
        let message = "m".repeat(MAX_MESSAGE_LENGTH);
        assert!(input(&name, "a@b.com", &message).validate().is_ok());

        let name = "n".repeat(MAX_NAME_LENGTH + 1);
        let message = "m".repeat(MAX_MESSAGE_LENGTH + 1);
        let errors = input(&name, "a@b.com", &message).validate().unwrap_err();
        assert_eq!(
            vec!["Name too long".to_string(), "Message too long".to_string()],
            errors
        );

        // characters, not bytes
        let name = "é".repeat(MAX_NAME_LENGTH);
        assert!(input(&name, "a@b.com", "hi").validate().is_ok());
    }

    #[test]
    fn test_entry_type() {
        let mut values = input("Alice", "a@b.com", "hi");

        values.entry_type = Some(" Secret ".to_string());
        assert_eq!(EntryType::Secret, values.validate().unwrap().entry_type);

        values.entry_type = Some(String::new());
        assert_eq!(EntryType::Note, values.validate().unwrap().entry_type);

        values.entry_type = Some("diary".to_string());
        assert_eq!(
            vec!["Invalid entry type".to_string()],
            values.validate().unwrap_err()
        );
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(is_valid_email("a@b@c.d"));

        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn test_contains() {
        let entry = Entry {
            id: Uuid::new_v4(),
            name: "Groceries".to_string(),
            email: "a@b.com".to_string(),
            message: "Buy MILK".to_string(),
            entry_type: EntryType::Todo,
            file: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(entry.contains("grocer"));
        assert!(entry.contains("milk"));
        assert!(entry.contains("todo"));
        assert!(!entry.contains("a@b.com"));
    }
}
