/*!
Identities, their roles, and the directory of known identities.
*/
use std::io::Read;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin   => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin"   => Ok(Role::Admin),
            _ => Err(format!("{:?} is not a valid Role.", s)),
        }
    }
}

/// An authenticated user record.
///
/// This is also exactly what gets persisted as the session, so the
/// serialized field names are part of the storage format.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    /// Case-insensitive email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /**
    Identity .csv rows should look like this

    ```csv
    #id, name,          email,                  role,    avatar
    7,   Mike Smith,    mike@example.com,       student,
    8,   Grace Hopper,  grace@example.com,      teacher, https://example.com/g.png
    ```

    The avatar column may be blank.
    */
    pub fn from_csv_line(
        row: &csv::StringRecord
    ) -> Result<Identity, String> {
        log::trace!("Identity::from_csv_line( {:?} ) called.", row);

        let id = match row.get(0) {
            Some(s) if !s.is_empty() => s.to_owned(),
            _ => { return Err("no id".to_owned()); }
        };
        let name = match row.get(1) {
            Some(s) if !s.is_empty() => s.to_owned(),
            _ => { return Err("no name".to_owned()); }
        };
        let email = match row.get(2) {
            Some(s) if !s.is_empty() => s.to_owned(),
            _ => { return Err("no email address".to_owned()); }
        };
        let role: Role = match row.get(3) {
            Some(s) => s.parse()?,
            None => { return Err("no role".to_owned()); }
        };
        let avatar = match row.get(4) {
            Some(s) if !s.is_empty() => Some(s.to_owned()),
            _ => None,
        };

        Ok(Identity { id, name, email, role, avatar })
    }

    pub fn vec_from_csv_reader<R: Read>(r: R) -> Result<Vec<Identity>, String> {
        log::trace!("Identity::vec_from_csv_reader(...) called.");

        let mut csv_reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .has_headers(false)
            .from_reader(r);

        let mut idents: Vec<Identity> = Vec::new();

        for (n, res) in csv_reader.records().enumerate() {
            let record = res.map_err(|e| match e.position() {
                Some(p) => format!("Error on line {}: {}", p.line(), &e),
                None => format!("Error in CSV record {}: {}", &n, &e),
            })?;
            let ident = Identity::from_csv_line(&record).map_err(|e| {
                match record.position() {
                    Some(p) => format!("Error on line {}: {}", p.line(), &e),
                    None => format!("Error in CSV record {}: {}", &n, &e),
                }
            })?;
            idents.push(ident);
        }

        log::trace!(
            "Identity::vec_from_csv_reader() returns {} Identities.",
            idents.len()
        );
        Ok(idents)
    }
}

fn avatar_for(name: &str, background: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background={}&color=fff",
        name.replace(' ', "+"), background
    )
}

/// Avatar URI given to newly-registered identities.
pub fn default_avatar(name: &str) -> String {
    avatar_for(name, "4a6cf7")
}

/// The three identities every fresh directory knows about.
pub fn mock_identities() -> Vec<Identity> {
    vec![
        Identity {
            id: "1".to_owned(),
            name: "John Student".to_owned(),
            email: "student@example.com".to_owned(),
            role: Role::Student,
            avatar: Some(avatar_for("John Student", "4a6cf7")),
        },
        Identity {
            id: "2".to_owned(),
            name: "Jane Teacher".to_owned(),
            email: "teacher@example.com".to_owned(),
            role: Role::Teacher,
            avatar: Some(avatar_for("Jane Teacher", "8b5cf6")),
        },
        Identity {
            id: "3".to_owned(),
            name: "Admin User".to_owned(),
            email: "admin@example.com".to_owned(),
            role: Role::Admin,
            avatar: Some(avatar_for("Admin User", "e779c1")),
        },
    ]
}

/// Every `Identity` the session store can log in as.
///
/// Only grows, and only by registration.
#[derive(Debug, Default)]
pub struct Directory {
    idents: Vec<Identity>,
}

impl Directory {
    pub fn new(idents: Vec<Identity>) -> Self {
        Self { idents }
    }

    pub fn mock() -> Self {
        Self::new(mock_identities())
    }

    pub fn identities(&self) -> &[Identity] { &self.idents }

    pub fn len(&self) -> usize { self.idents.len() }

    pub fn is_empty(&self) -> bool { self.idents.is_empty() }

    pub fn count_role(&self, role: Role) -> usize {
        self.idents.iter().filter(|i| i.role == role).count()
    }

    /// First identity with the given email (any case) and role.
    pub fn find(&self, email: &str, role: Role) -> Option<&Identity> {
        self.idents.iter().find(|i| i.role == role && i.has_email(email))
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.idents.iter().any(|i| i.has_email(email))
    }

    pub(crate) fn insert(&mut self, ident: Identity) {
        log::trace!("Directory::insert( {:?} ) called.", &ident.email);
        self.idents.push(ident);
    }
}
