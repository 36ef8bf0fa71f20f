use std::cmp::Ordering;

/// Outcome of asking an [`Oracle`] where a candidate belongs relative to a
/// bucket representative.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Verdict {
    /// The candidate ranks ahead of the representative (toward bucket 0).
    CandidatePreferred,
    /// The representative ranks ahead of the candidate.
    RepresentativePreferred,
    /// Both are equally good; the candidate joins the representative's bucket.
    Tie,
    /// No answer is available. Never treated as a tie.
    Undecidable,
}

impl Verdict {
    /// Maps a candidate-vs-representative ordering where `Less` sorts first.
    #[inline]
    pub fn from_ordering(ordering: Option<Ordering>) -> Self {
        match ordering {
            Some(Ordering::Less) => Verdict::CandidatePreferred,
            Some(Ordering::Greater) => Verdict::RepresentativePreferred,
            Some(Ordering::Equal) => Verdict::Tie,
            None => Verdict::Undecidable,
        }
    }

    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Verdict::CandidatePreferred => Verdict::RepresentativePreferred,
            Verdict::RepresentativePreferred => Verdict::CandidatePreferred,
            other => other,
        }
    }
}

/// Decides the relative order of two items.
///
/// Called exactly once per binary-search probe and never cached, so an
/// implementation is free to consult live state such as a person at a prompt.
pub trait Oracle<T: ?Sized> {
    fn compare(&mut self, candidate: &T, representative: &T) -> Verdict;
}

impl<T, F> Oracle<T> for F
where
    T: ?Sized,
    F: FnMut(&T, &T) -> Verdict,
{
    #[inline]
    fn compare(&mut self, candidate: &T, representative: &T) -> Verdict {
        self(candidate, representative)
    }
}

/// Natural order, smallest value first. Incomparable values are undecidable.
#[derive(Copy, Clone, Debug, Default)]
pub struct Ascending;

impl<T: PartialOrd + ?Sized> Oracle<T> for Ascending {
    #[inline]
    fn compare(&mut self, candidate: &T, representative: &T) -> Verdict {
        Verdict::from_ordering(candidate.partial_cmp(representative))
    }
}

/// Natural order, largest value first.
#[derive(Copy, Clone, Debug, Default)]
pub struct Descending;

impl<T: PartialOrd + ?Sized> Oracle<T> for Descending {
    #[inline]
    fn compare(&mut self, candidate: &T, representative: &T) -> Verdict {
        Verdict::from_ordering(candidate.partial_cmp(representative)).reverse()
    }
}
