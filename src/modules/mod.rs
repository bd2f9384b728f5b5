pub mod accounts;

pub use self::accounts::model::CredentialView;
pub use self::accounts::model::Role;
