use crate::app::Model;
use crate::app::model::{Prompt, PromptOutcome};
use crate::editor::EditInput;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Deliver an input to the active surface
    Edit(EditInput),

    // Notes
    /// Persist the current note immediately
    Save,
    /// Create and open a new untitled note
    NewNote,
    /// Delete the current note and open the next one
    DeleteNote,
    /// Open the next note in the list
    NextNote,
    /// Open the previous note in the list
    PrevNote,
    /// The store file changed outside this process
    StoreChanged,

    // Preview
    /// Show or hide the rendered preview
    TogglePreview,

    // Prompt line

    /// Open the insert-link prompt
    StartLink,
    /// Open the rename prompt
    StartRename,
    /// Replace the prompt's current field
    PromptInput(String),
    /// Accept the current prompt field
    PromptSubmit,
    /// Close the prompt without inserting
    PromptCancel,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Apply a message to the model.
///
/// All state transitions happen here. Store access happens afterwards, in
/// the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Edit(input) => apply_edit(&mut model, input),

        Message::TogglePreview => {
            model.preview_visible = !model.preview_visible;
            model.refresh_preview();
        }

        Message::StartLink => {
            model.prompt = Some(Prompt::link());
        }
        Message::StartRename => {
            model.prompt = Some(Prompt::title(&model.session.note().title));
        }
        Message::PromptInput(value) => {
            if let Some(prompt) = model.prompt.as_mut() {
                prompt.set_input(value);
            }
        }
        Message::PromptSubmit => {
            if let Some(prompt) = model.prompt.take() {
                match prompt.submit() {
                    PromptOutcome::Edit(input) => apply_edit(&mut model, input),
                    PromptOutcome::Rename(title) => {
                        model.session.set_title(title, model.now_ms);
                        model.sync_current();
                    }
                    PromptOutcome::Next(next) => model.prompt = Some(next),
                    PromptOutcome::Cancel => {}
                }
            }
        }
        Message::PromptCancel => {
            model.prompt = None;
        }

        Message::Resize(width, height) => {
            model.width = width;
            model.height = height;
            model.ensure_caret_visible();
        }

        Message::Quit => {
            model.should_quit = true;
        }

        // Store access: handled in side effects
        Message::Save
        | Message::NewNote
        | Message::DeleteNote
        | Message::NextNote
        | Message::PrevNote
        | Message::StoreChanged
        | Message::Redraw => {}
    }
    model
}

fn apply_edit(model: &mut Model, input: EditInput) {
    let outcome = model.session.input(input, model.now_ms);
    if outcome.is_change() {
        model.refresh_preview();
    }
}
