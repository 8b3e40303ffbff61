//! Plain-text rendering of the client view models.

use std::fmt::Write;

use bookstore_client::{Book, BookCard, ConfirmModal, ListScreen, Toast, ToastKind, Tone};

pub fn screen(screen: &ListScreen) -> String {
    match screen {
        ListScreen::Progress(message) | ListScreen::Empty(message) => message.to_string(),
        ListScreen::Error(message) => message.clone(),
        ListScreen::Cards(cards) => {
            let mut out = format!("Our Book Collection ({})\n", cards.len());
            for card in cards {
                out.push('\n');
                out.push_str(&self::card(card));
            }
            out
        }
    }
}

pub fn card(card: &BookCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  [{}]", card.title, card.id);
    let _ = writeln!(out, "  {}", card.byline);
    let _ = writeln!(out, "  {}", card.genre);
    let _ = writeln!(out, "  {}  {}", card.price, card.stock);
    let _ = writeln!(out, "  {}", card.cover);
    out
}

pub fn details(book: &Book) -> String {
    let mut out = self::card(&BookCard::from(book));
    if let Some(description) = &book.description {
        let _ = writeln!(out, "\n  {description}");
    }
    if let Some(isbn) = &book.isbn {
        let _ = writeln!(out, "  ISBN: {isbn}");
    }
    out
}

pub fn confirm(confirm: &ConfirmModal) -> String {
    let (confirm_label, _) = confirm.labels();
    let marker = match confirm.current_tone() {
        Tone::Danger => "!",
        Tone::Primary => "?",
    };
    format!(
        "{marker} {}: {} ({confirm_label})",
        confirm.modal().title(),
        confirm.message()
    )
}

pub fn toast(toast: &Toast) -> String {
    match toast.kind {
        ToastKind::Success => format!("✓ {}", toast.message),
        ToastKind::Error => format!("✗ {}", toast.message),
    }
}
