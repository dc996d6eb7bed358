pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Forms:
  Tab / Shift+Tab   Next/previous field
  ↑ / ↓             Choose a discovered gateway
  Type              Edit host or port
  Ctrl + U          Clear the current field
  Enter             Submit the step
  Ctrl + R          Reload the step (runs discovery again)

General:
  ?                 Toggle this help (outside text fields)
  Shift + E         Show latest error details
  Esc / Ctrl + Q    Quit
"#
        .to_string()
    }
}
