//! Auth domain actions - registration, login and profile

mod login;
mod profile;
mod register;
mod session;

pub use login::{login, LoginInput};
pub use profile::get_profile;
pub use register::{register, RegisterInput};
pub use session::{AuthSession, ProfileView, SessionUser};
