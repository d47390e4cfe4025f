mod state;

pub use state::{
    App, AppEvent, ConfirmAction, ConfirmState, InputMode, PickerAction, PickerState,
    PromptAction, PromptState, ViewPane,
};
