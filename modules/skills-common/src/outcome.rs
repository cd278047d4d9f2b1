/// One unit of requested work: a single URL or query, tagged with its
/// position in the invocation. Flags shared by every item live with the
/// skill's dispatcher, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub target: String,
}

/// Terminal failure for one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub item: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }
}

/// Outcomes for every work item of a run, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult<T> {
    pub outcomes: Vec<Outcome<T>>,
}

impl<T> RunResult<T> {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().filter_map(Outcome::success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.outcomes.iter().filter_map(Outcome::failure)
    }

    /// True when no item succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.iter().any(Outcome::is_success)
    }
}

impl<T> From<Vec<Outcome<T>>> for RunResult<T> {
    fn from(outcomes: Vec<Outcome<T>>) -> Self {
        Self { outcomes }
    }
}
