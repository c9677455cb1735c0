// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of the engine's navigation controls as Telegram inline keyboards.

use roundup_core::types::Keyboard;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Converts a transport-agnostic [`Keyboard`] into Telegram markup.
///
/// Every button becomes a callback button carrying its encoded action tag
/// as callback data.
pub fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| {
                InlineKeyboardButton::callback(button.label.clone(), button.action.encode())
            })
            .collect::<Vec<_>>()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundup_core::ActionTag;
    use roundup_core::types::Button;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn buttons_become_callback_buttons() {
        let keyboard = Keyboard::single(Button::new("Start", ActionTag::StartForm));
        let markup = to_markup(&keyboard);

        assert_eq!(markup.inline_keyboard.len(), 1);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, "Start");
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "start_form"),
            other => panic!("expected callback data, got {other:?}"),
        }
    }

    #[test]
    fn rows_are_preserved() {
        let keyboard = Keyboard {
            rows: vec![
                vec![Button::new("Back", ActionTag::BackToQuestion(1))],
                vec![Button::new("Restart", ActionTag::BackToStart)],
            ],
        };
        let markup = to_markup(&keyboard);
        assert_eq!(markup.inline_keyboard.len(), 2);
        match &markup.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, "back_to_question_1");
            }
            other => panic!("expected callback data, got {other:?}"),
        }
    }
}
