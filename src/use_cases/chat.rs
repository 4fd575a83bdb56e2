// Bounded room chat shared by both seats.

use crate::domain::errors::SessionError;
use crate::domain::room::{ChatMessage, RoomSnapshot, SeatRole};
use crate::use_cases::SessionEngine;

impl SessionEngine {
    /// Appends a chat line for the seat. Text is trimmed and bounded.
    pub async fn post_chat(
        &self,
        code: &str,
        role: SeatRole,
        token: &str,
        text: &str,
    ) -> Result<RoomSnapshot, SessionError> {
        let handle = self.existing_room(code).await?;
        let mut room = handle.lock().await;
        Self::authorize(&room, role, token)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if text.chars().count() > self.settings.chat_max_len {
            return Err(SessionError::MessageTooLong);
        }

        let at_ms = self.now_millis();
        room.chat.push(ChatMessage {
            speaker: role.into(),
            text: text.to_string(),
            at_ms,
        });

        Ok(room.snapshot())
    }
}
