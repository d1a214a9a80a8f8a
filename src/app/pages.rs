use super::shell::{AppSender, Section, ToastKind};

/// Entries of the settings page.
pub const SETTINGS_ENTRIES: &[&str] = &["Profile", "Appearance", "Display", "Notifications", "Privacy"];

/// Call to action on a page's empty state: where it leads and what it tells the user.
pub fn empty_state_action(section: Section) -> Option<(Section, &'static str)> {
    match section {
        Section::Favorites => Some((
            Section::Gallery,
            "Start exploring wallpapers to add favorites!",
        )),
        Section::Downloads => Some((
            Section::Gallery,
            "Visit the gallery to start downloading wallpapers!",
        )),
        _ => None,
    }
}

/// Run the empty-state call to action of `section`, if it has one.
pub fn trigger_empty_state(sender: &AppSender, section: Section) -> bool {
    match empty_state_action(section) {
        Some((target, message)) => {
            sender.navigate(target);
            sender.toast(message, ToastKind::Info);
            true
        }
        None => false,
    }
}

pub fn open_settings_entry(sender: &AppSender, title: &str) {
    sender.toast(format!("{} settings coming soon!", title), ToastKind::Info);
}
