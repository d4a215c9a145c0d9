//! Text output formatting with colors.

use chrono::{DateTime, Local, NaiveDateTime};
use newdle_core::{slot_time, Availability, BusySlot, Newdle, Participant, User, UserSearch};
use newdle_store::Settings;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Formats the greeting after a login.
    pub fn format_login(&self, user: &User) -> String {
        format!("Logged in as {}\n{}", self.bold(&user.name), self.format_user(user))
    }

    /// Formats a user profile.
    pub fn format_user(&self, user: &User) -> String {
        let mut lines = vec![
            format!("Name:  {}", user.name),
            format!("Email: {}", self.cyan(&user.email)),
            format!("UID:   {}", self.dim(&user.uid)),
        ];
        if let Some(avatar) = &user.avatar_url {
            lines.push(format!("Avatar: {}", self.dim(avatar)));
        }
        lines.join("\n")
    }

    /// Formats user search results.
    pub fn format_user_search(&self, search: &UserSearch) -> String {
        if search.users.is_empty() {
            return self.dim("No users found");
        }

        let mut lines = Vec::new();
        for user in &search.users {
            lines.push(format!("{:<30} {}", user.name, self.cyan(&user.email)));
        }
        let shown = search.users.len();
        if u32::try_from(shown).is_ok_and(|n| n < search.total) {
            lines.push(self.dim(&format!("{shown} of {} shown", search.total)));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Newdles
    // ========================================================================

    /// Formats a list of newdles, one per line.
    pub fn format_newdle_list(&self, newdles: &[Newdle]) -> String {
        if newdles.is_empty() {
            return self.dim("No newdles");
        }

        newdles
            .iter()
            .map(|newdle| {
                format!(
                    "{:<10} {:<32} {} {}",
                    newdle.code,
                    newdle.title,
                    self.status(newdle),
                    self.dim(&format!(
                        "{}/{} answered",
                        newdle.answered_count(),
                        newdle.participants.len()
                    ))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats one newdle with its slots and participants.
    pub fn format_newdle(&self, newdle: &Newdle) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} ({})", self.bold(&newdle.title), newdle.code));
        lines.push("─".repeat(50));
        lines.push(format!("Status:   {}", self.status(newdle)));
        lines.push(format!("Duration: {} min", newdle.duration));
        lines.push(format!("Timezone: {}", newdle.timezone));
        if let Some(creator) = &newdle.creator_name {
            lines.push(format!("Creator:  {creator}"));
        }
        if let Some(url) = &newdle.url {
            lines.push(format!("Link:     {}", self.cyan(url)));
        }

        if !newdle.timeslots.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("Timeslots:"));
            for slot in &newdle.timeslots {
                lines.push(self.format_slot(newdle, slot));
            }
        }

        if !newdle.participants.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("Participants:"));
            for participant in &newdle.participants {
                let mark = if participant.has_answered() {
                    self.green("✓")
                } else {
                    self.dim("−")
                };
                lines.push(format!("  {mark} {}", participant.name));
            }
        }

        lines.join("\n")
    }

    /// Formats a single slot with an availability bar.
    fn format_slot(&self, newdle: &Newdle, slot: &NaiveDateTime) -> String {
        let key = slot_time::format(slot);
        let (available, ifneedbe) = slot_counts(&newdle.participants, &key);
        let total = newdle.participants.len();

        let marker = if newdle.final_dt.as_ref() == Some(slot) {
            self.green("★")
        } else {
            " ".to_string()
        };

        format!(
            "{marker} {} {} {}",
            slot.format("%a %Y-%m-%d %H:%M"),
            self.availability_bar(available, total),
            self.dim(&format!("{available} yes, {ifneedbe} if need be"))
        )
    }

    /// Formats a participant and their answers.
    pub fn format_participant(&self, participant: &Participant) -> String {
        let mut lines = vec![self.bold(&participant.name)];

        if participant.answers.is_empty() {
            lines.push(self.dim("No answers yet"));
        }
        for (slot, answer) in &participant.answers {
            lines.push(format!("  {slot}  {}", self.answer(*answer)));
        }
        if !participant.comment.is_empty() {
            lines.push(format!("Comment: {}", participant.comment));
        }

        lines.join("\n")
    }

    /// Formats busy intervals of one day.
    pub fn format_busy(&self, slots: &[BusySlot]) -> String {
        if slots.is_empty() {
            return self.green("Free all day");
        }
        slots
            .iter()
            .map(|BusySlot(start, end)| format!("{} {start} - {end}", self.red("busy")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats one refresh of the watch screen.
    pub fn format_watch(&self, newdle: &Newdle, refreshed: DateTime<Local>, interval: u64) -> String {
        format!(
            "newdle watch - {} (refresh: {interval}s)\n{}\n\n{}\n\nPress Ctrl+C to exit",
            refreshed.format("%H:%M:%S"),
            "─".repeat(50),
            self.format_newdle(newdle)
        )
    }

    /// Formats an error message.
    pub fn format_error(&self, error: &str) -> String {
        format!("{}: {error}", self.red("Error"))
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Formats the settings and the files they live in.
    pub fn format_settings(&self, settings: &Settings, path: &str, token_path: &str) -> String {
        [
            self.bold("newdle Configuration"),
            "─".repeat(40),
            format!("Server:        {}", self.cyan(&settings.base_url)),
            format!("Timeout:       {}s", settings.timeout_secs),
            format!("Log level:     {}", settings.log_level),
            format!("Persist token: {}", settings.persist_token),
            String::new(),
            format!("Settings file: {}", self.dim(path)),
            format!("Token file:    {}", self.dim(token_path)),
        ]
        .join("\n")
    }

    // ========================================================================
    // Bars & labels
    // ========================================================================

    /// Formats a bar filled in proportion to `count / total`.
    pub fn availability_bar(&self, count: usize, total: usize) -> String {
        let filled = match total {
            0 => 0,
            _ => ((count * self.bar_width + total / 2) / total).min(self.bar_width),
        };
        let empty = self.bar_width - filled;

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        if count * 2 >= total && total > 0 {
            self.green(&bar)
        } else {
            bar
        }
    }

    fn status(&self, newdle: &Newdle) -> String {
        if newdle.deleted {
            self.red("deleted")
        } else if let Some(final_dt) = &newdle.final_dt {
            self.green(&format!("final {}", final_dt.format("%Y-%m-%d %H:%M")))
        } else {
            self.yellow("open")
        }
    }

    fn answer(&self, answer: Availability) -> String {
        match answer {
            Availability::Available => self.green(answer.label()),
            Availability::Ifneedbe => self.yellow(answer.label()),
            Availability::Unavailable => self.red(answer.label()),
        }
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Counts "available" and "if need be" answers for one slot key.
pub fn slot_counts(participants: &[Participant], slot: &str) -> (usize, usize) {
    participants
        .iter()
        .filter_map(|p| p.answer_for(slot))
        .fold((0, 0), |(yes, maybe), answer| match answer {
            Availability::Available => (yes + 1, maybe),
            Availability::Ifneedbe => (yes, maybe + 1),
            Availability::Unavailable => (yes, maybe),
        })
}
