//! Account registration: the form, its validation schema and the reply
//! mapping. The HTTP client and background worker live in the submodules.

pub mod client;
pub mod worker;

use serde::Serialize;
use std::fmt;

use crate::validation::{FieldSchema, FieldSource, Refinement, Rule, Schema};

// ─── Field names (as the backend expects them) ────────────────────────────────

pub const NAME:                  &str = "name";
pub const EMAIL:                 &str = "email";
pub const PASSWORD:              &str = "password";
pub const PASSWORD_CONFIRMATION: &str = "passwordConfirmation";

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub name:                  String,
    pub email:                 String,
    pub password:              String,
    pub password_confirmation: String,
}

impl RegisterForm {
    pub fn get(&self, field: RegisterField) -> &str {
        match field {
            RegisterField::Name                 => &self.name,
            RegisterField::Email                => &self.email,
            RegisterField::Password             => &self.password,
            RegisterField::PasswordConfirmation => &self.password_confirmation,
        }
    }

    pub fn get_mut(&mut self, field: RegisterField) -> &mut String {
        match field {
            RegisterField::Name                 => &mut self.name,
            RegisterField::Email                => &mut self.email,
            RegisterField::Password             => &mut self.password,
            RegisterField::PasswordConfirmation => &mut self.password_confirmation,
        }
    }
}

// Passwords stay out of logs.
impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("password_confirmation", &"***")
            .finish()
    }
}

impl FieldSource for RegisterForm {
    fn value(&self, field: &str) -> Option<&str> {
        RegisterField::from_key(field).map(|f| self.get(f))
    }
}

/// Form fields in on-screen order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegisterField {
    #[default]
    Name,
    Email,
    Password,
    PasswordConfirmation,
}

impl RegisterField {
    pub const ALL: [RegisterField; 4] = [
        RegisterField::Name,
        RegisterField::Email,
        RegisterField::Password,
        RegisterField::PasswordConfirmation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RegisterField::Name                 => NAME,
            RegisterField::Email                => EMAIL,
            RegisterField::Password             => PASSWORD,
            RegisterField::PasswordConfirmation => PASSWORD_CONFIRMATION,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            RegisterField::Name                 => "Name",
            RegisterField::Email                => "Email",
            RegisterField::Password             => "Password",
            RegisterField::PasswordConfirmation => "Confirm Password",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            RegisterField::Name  => "Name...",
            RegisterField::Email => "Email...",
            _                    => "••••••••",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, RegisterField::Password | RegisterField::PasswordConfirmation)
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ─── Schema ───────────────────────────────────────────────────────────────────

pub fn register_schema() -> Schema {
    Schema::new()
        .field(FieldSchema::new(PASSWORD)
            .rule(Rule::min_len(6, "Password too short - should be 6 chars minimum"))
            .rule(Rule::required("Password is required")))
        .field(FieldSchema::new(NAME)
            .rule(Rule::min_len(2, "name too short - should be 2 chars minimum"))
            .rule(Rule::required("name is required")))
        .field(FieldSchema::new(PASSWORD_CONFIRMATION)
            .rule(Rule::required("passwordConfirmation is required")))
        .field(FieldSchema::new(EMAIL)
            .rule(Rule::email("Not a valid email"))
            .rule(Rule::required("Email is required")))
        .refine(Refinement::matches(PASSWORD_CONFIRMATION, PASSWORD, "Passwords do not match"))
}

// ─── Outcome ──────────────────────────────────────────────────────────────────

pub const UNEXPECTED_ERROR: &str = "unexpected error occured";

/// What the backend said about a well-formed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    AlreadyExists,
    Other(String),
}

impl RegisterOutcome {
    pub fn from_message(message: &str) -> Self {
        match message {
            "success"             => RegisterOutcome::Created,
            "user already exists" => RegisterOutcome::AlreadyExists,
            other                 => RegisterOutcome::Other(other.to_owned()),
        }
    }

    pub fn status_line(&self) -> String {
        match self {
            RegisterOutcome::Created       => "user Created successfully".to_owned(),
            RegisterOutcome::AlreadyExists => "email already used by another user".to_owned(),
            RegisterOutcome::Other(msg)    => format!("server replied: {msg}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! One-shot HTTP server for exercising the client without a backend.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::RegisterForm;

    pub fn valid_form() -> RegisterForm {
        RegisterForm {
            name:                  "Ada".into(),
            email:                 "ada@example.com".into(),
            password:              "hunter22".into(),
            password_confirmation: "hunter22".into(),
        }
    }

    /// Accepts one connection, answers with `status` and `body`, and yields
    /// the raw request it received.
    pub async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr     = listener.local_addr().unwrap();
        let handle   = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let request = read_request(&mut sock).await;
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len(),
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    async fn read_request(sock: &mut tokio::net::TcpStream) -> String {
        let mut buf   = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 { break; }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let len  = head.lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len { break; }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::valid_form;
    use super::*;

    #[test]
    fn empty_form_shows_first_message_per_field() {
        let errs = register_schema().validate(&RegisterForm::default()).unwrap_err();
        assert_eq!(errs.first(PASSWORD), Some("Password too short - should be 6 chars minimum"));
        assert_eq!(errs.first(NAME), Some("name too short - should be 2 chars minimum"));
        assert_eq!(errs.first(PASSWORD_CONFIRMATION), Some("passwordConfirmation is required"));
        assert_eq!(errs.first(EMAIL), Some("Not a valid email"));
    }

    #[test]
    fn mismatched_confirmation_is_reported() {
        let mut form = valid_form();
        form.password_confirmation = "hunter23".into();
        let errs = register_schema().validate(&form).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.first(PASSWORD_CONFIRMATION), Some("Passwords do not match"));
    }

    #[test]
    fn mismatch_is_listed_after_field_rules() {
        let form = valid_form_without_confirmation();
        let errs = register_schema().validate(&form).unwrap_err();
        let msgs: Vec<&str> = errs.messages(PASSWORD_CONFIRMATION).collect();
        assert_eq!(msgs, ["passwordConfirmation is required", "Passwords do not match"]);
    }

    fn valid_form_without_confirmation() -> RegisterForm {
        RegisterForm { password_confirmation: String::new(), ..valid_form() }
    }

    #[test]
    fn valid_form_passes() {
        assert_eq!(register_schema().validate(&valid_form()), Ok(()));
    }

    #[test]
    fn short_values_fail_min_length() {
        let form = RegisterForm {
            name: "A".into(),
            password: "abc".into(),
            password_confirmation: "abc".into(),
            ..valid_form()
        };
        let errs = register_schema().validate(&form).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs.first(NAME), Some("name too short - should be 2 chars minimum"));
        assert_eq!(errs.first(PASSWORD), Some("Password too short - should be 6 chars minimum"));
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let json = serde_json::to_value(valid_form()).unwrap();
        assert_eq!(json["passwordConfirmation"], "hunter22");
        assert_eq!(json["name"], "Ada");
        assert!(json.get("password_confirmation").is_none());
    }

    #[test]
    fn debug_hides_passwords() {
        let dbg = format!("{:?}", valid_form());
        assert!(!dbg.contains("hunter22"));
        assert!(dbg.contains("ada@example.com"));
    }

    #[test]
    fn field_navigation_wraps() {
        assert_eq!(RegisterField::Name.prev(), RegisterField::PasswordConfirmation);
        assert_eq!(RegisterField::PasswordConfirmation.next(), RegisterField::Name);
        assert_eq!(RegisterField::Email.next(), RegisterField::Password);
        for f in RegisterField::ALL {
            assert_eq!(RegisterField::from_key(f.key()), Some(f));
        }
    }

    #[test]
    fn outcome_mapping() {
        assert_eq!(RegisterOutcome::from_message("success"), RegisterOutcome::Created);
        assert_eq!(RegisterOutcome::from_message("user already exists"), RegisterOutcome::AlreadyExists);
        assert_eq!(
            RegisterOutcome::from_message("maintenance"),
            RegisterOutcome::Other("maintenance".into()),
        );
        assert_eq!(RegisterOutcome::Created.status_line(), "user Created successfully");
        assert_eq!(RegisterOutcome::AlreadyExists.status_line(), "email already used by another user");
    }
}
