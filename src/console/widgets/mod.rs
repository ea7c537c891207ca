pub mod loading;
pub mod option_buttons;
pub mod text_input;

pub use loading::{LoadingIndicator, LoadingPlaceholder};
pub use option_buttons::OptionButtons;
pub use text_input::{TextInput, TextInputWidget};
