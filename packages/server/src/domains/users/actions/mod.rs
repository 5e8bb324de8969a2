//! Users domain actions - profile and dependent management

mod dependents;
mod profile;

pub use dependents::{
    add_dependent, added_message, remove_dependent, update_dependent, DependentUpdateInput,
    NewDependentInput,
};
pub use profile::{update_profile, UpdateProfileInput};
