use crate::app::App;
use crate::input::InputAction;

pub fn dispatch(app: &mut App, action: InputAction) {
    // An open alert swallows everything except acknowledging it or quitting.
    if app.alert().is_some() {
        match action {
            InputAction::Quit => app.should_quit = true,
            InputAction::Dismiss | InputAction::Primary => app.dismiss_alert(),
            _ => {}
        }
        return;
    }
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::MoveUp => app.move_cursor(false),
        InputAction::MoveDown => app.move_cursor(true),
        InputAction::Dismiss => app.show_help = false,
        InputAction::Primary => app.activate_primary(),
        InputAction::Shuffle => app.shuffle(),
    }
}
