use tracing::debug;

/// A destructive change that waits for the user to accept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructiveAction {
    DeleteEntry { date: String, timestamp: i64 },
    ClearDay { date: String },
}

impl DestructiveAction {
    pub fn date(&self) -> &str {
        match self {
            DestructiveAction::DeleteEntry { date, .. } | DestructiveAction::ClearDay { date } => {
                date
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub action: DestructiveAction,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Accepted(DestructiveAction),
    Declined(DestructiveAction),
    /// No pending request carries this id: it was answered or superseded.
    Expired,
}

/// Holds at most one unanswered confirmation. Asking again replaces the
/// pending request, which then counts as declined.
#[derive(Debug, Default)]
pub struct ConfirmGate {
    next_id: u64,
    pending: Option<ConfirmRequest>,
}

impl ConfirmGate {
    pub fn request(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        action: DestructiveAction,
    ) -> ConfirmRequest {
        self.next_id += 1;
        if let Some(previous) = self.pending.take() {
            debug!(id = previous.id, "superseded pending confirmation");
        }

        let request = ConfirmRequest {
            id: self.next_id,
            title: title.into(),
            body: body.into(),
            action,
        };
        self.pending = Some(request.clone());
        request
    }

    pub fn resolve(&mut self, id: u64, accepted: bool) -> Resolution {
        match self.pending.take() {
            Some(request) if request.id == id => {
                if accepted {
                    Resolution::Accepted(request.action)
                } else {
                    Resolution::Declined(request.action)
                }
            }
            other => {
                self.pending = other;
                Resolution::Expired
            }
        }
    }

    pub fn pending(&self) -> Option<&ConfirmRequest> {
        self.pending.as_ref()
    }
}
