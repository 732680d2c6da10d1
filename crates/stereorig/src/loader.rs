/// Identifies one pair-load request. Newer tickets always compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Decision taken for a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadVerdict {
    /// The completion belongs to the newest request and should be applied.
    Current,
    /// A newer request was issued after this one; drop the result.
    Superseded,
}

/// Bookkeeping for asynchronous pair loads.
///
/// Every request supersedes the ones before it. Only the completion carrying
/// the newest ticket is accepted, so a slow decode of an old pair can never
/// overwrite a newer one.
#[derive(Debug, Default)]
pub struct PairLoader {
    issued: u64,
    outstanding: Option<LoadTicket>,
}

impl PairLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> LoadTicket {
        self.issued += 1;
        let ticket = LoadTicket(self.issued);
        if let Some(previous) = self.outstanding.replace(ticket) {
            tracing::debug!(
                superseded = previous.id(),
                ticket = ticket.id(),
                "new pair load supersedes in-flight request"
            );
        }
        ticket
    }

    /// Classifies a completion. An accepted ticket is consumed, so a repeated
    /// delivery of the same ticket is reported as superseded.
    pub fn complete(&mut self, ticket: LoadTicket) -> LoadVerdict {
        if self.outstanding == Some(ticket) {
            self.outstanding = None;
            LoadVerdict::Current
        } else {
            LoadVerdict::Superseded
        }
    }

    pub fn in_flight(&self) -> Option<LoadTicket> {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_request_wins() {
        let mut loader = PairLoader::new();
        let first = loader.request();
        let second = loader.request();
        assert!(second > first);
        assert_eq!(loader.complete(first), LoadVerdict::Superseded);
        assert_eq!(loader.complete(second), LoadVerdict::Current);
        assert_eq!(loader.in_flight(), None);
    }

    #[test]
    fn late_completion_after_newer_one_is_still_discarded() {
        let mut loader = PairLoader::new();
        let first = loader.request();
        let second = loader.request();
        assert_eq!(loader.complete(second), LoadVerdict::Current);
        assert_eq!(loader.complete(first), LoadVerdict::Superseded);
    }

    #[test]
    fn duplicate_delivery_is_ignored() {
        let mut loader = PairLoader::new();
        let ticket = loader.request();
        assert_eq!(loader.complete(ticket), LoadVerdict::Current);
        assert_eq!(loader.complete(ticket), LoadVerdict::Superseded);
    }
}
