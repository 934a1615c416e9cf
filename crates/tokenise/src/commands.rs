//! Main menu entries and their dispatch.

use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Analyse,
    FillMask,
    Exit,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub action: Action,
}

pub const MENU: &[MenuEntry] = &[
    MenuEntry {
        key: "1",
        label: "Run Tokenization Analysis",
        action: Action::Analyse,
    },
    MenuEntry {
        key: "2",
        label: "Interactive Fill-in-the-Blank",
        action: Action::FillMask,
    },
    MenuEntry {
        key: "3",
        label: "Exit",
        action: Action::Exit,
    },
];

/// Look up the action for a menu choice. Surrounding whitespace is ignored.
pub fn dispatch(choice: &str) -> Option<Action> {
    let choice = choice.trim();
    MENU.iter()
        .find(|entry| entry.key == choice)
        .map(|entry| entry.action)
}

/// The menu as printed before each prompt.
pub fn render_menu() -> String {
    let mut menu = String::from("--- Project Menu ---\n");
    for entry in MENU {
        let _ = writeln!(menu, "{}: {}", entry.key, entry.label);
    }
    menu
}

/// "1, 2, or 3"
pub fn choice_list() -> String {
    let keys: Vec<&str> = MENU.iter().map(|entry| entry.key).collect();
    match keys.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_routes_each_key() {
        assert_eq!(dispatch("1"), Some(Action::Analyse));
        assert_eq!(dispatch("2"), Some(Action::FillMask));
        assert_eq!(dispatch("3"), Some(Action::Exit));
    }

    #[test]
    fn test_dispatch_trims_input() {
        assert_eq!(dispatch(" 2 \n"), Some(Action::FillMask));
    }

    #[test]
    fn test_dispatch_unknown_choice() {
        assert_eq!(dispatch("4"), None);
        assert_eq!(dispatch(""), None);
        assert_eq!(dispatch("exit"), None);
    }

    #[test]
    fn test_render_menu() {
        assert_eq!(
            render_menu(),
            "--- Project Menu ---\n\
             1: Run Tokenization Analysis\n\
             2: Interactive Fill-in-the-Blank\n\
             3: Exit\n"
        );
    }

    #[test]
    fn test_choice_list() {
        assert_eq!(choice_list(), "1, 2, or 3");
    }
}
