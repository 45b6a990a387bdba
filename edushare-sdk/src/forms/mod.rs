//! Login and registration forms.
//!
//! Each form is a plain value type implementing [`FormSpec`], driven by a
//! [`FormMachine`] that owns validation and the submit cycle. [`FormView`]
//! turns a machine into something a UI can draw.

pub mod login;
pub mod register;
pub mod render;
pub mod state;

pub use login::{LoginForm, LoginValues};
pub use register::RegisterForm;
pub use render::{FieldRow, FormView};
pub use state::{Field, FieldKind, FormMachine, FormSpec, FormState};
