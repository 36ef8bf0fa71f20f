use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};
use crate::oracle::{Oracle, Verdict};

/// Mutually tied items, kept in the order they joined.
pub type Bucket<T> = SmallVec<[T; 4]>;

/// Outcome of placing an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement<T> {
    /// Bucket now holding the placed item.
    pub bucket: usize,
    /// `(item, new_bucket)` for every other item whose bucket index may have changed.
    pub shifted: Vec<(T, usize)>,
}

/// Outcome of removing an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal<T> {
    /// `Some(bucket)` when the bucket survived, `None` when it was dropped.
    pub bucket: Option<usize>,
    pub shifted: Vec<(T, usize)>,
}

/// One tier's ordered sequence of tie buckets.
///
/// Bucket 0 holds the most preferred items. Buckets are never empty and the
/// total item count is cached so `len` is O(1).
#[derive(Clone, Debug)]
pub struct BucketedRanking<T> {
    buckets: Vec<Bucket<T>>,
    len: usize,
}

impl<T> Default for BucketedRanking<T> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            len: 0,
        }
    }
}

impl<T> BucketedRanking<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ranking from already ordered buckets.
    pub fn from_buckets(buckets: Vec<Vec<T>>) -> Result<Self> {
        let mut out = Vec::with_capacity(buckets.len());
        let mut len = 0;
        for (bucket, items) in buckets.into_iter().enumerate() {
            if items.is_empty() {
                return Err(Error::EmptyBucket { bucket });
            }
            len += items.len();
            out.push(Bucket::from_vec(items));
        }
        Ok(Self { buckets: out, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, index: usize) -> Option<&[T]> {
        self.buckets.get(index).map(|b| b.as_slice())
    }

    pub fn buckets(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.buckets.iter().map(|b| b.as_slice())
    }

    /// Items in linear order, paired with their bucket index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .flat_map(|(idx, bucket)| bucket.iter().map(move |item| (idx, item)))
    }

    /// Resolves a linear position in `[0, len)` to `(bucket, offset)`.
    pub fn coords(&self, position: usize) -> Result<(usize, usize)> {
        let mut remaining = position;
        for (idx, bucket) in self.buckets.iter().enumerate() {
            if remaining < bucket.len() {
                return Ok((idx, remaining));
            }
            remaining -= bucket.len();
        }
        Err(Error::PositionOutOfRange {
            position,
            len: self.len,
        })
    }

    /// Replaces bucket `bucket` with its `[..offset]` and `[offset..]` halves.
    ///
    /// Offsets that would leave a half empty are rejected.
    pub(crate) fn split_bucket(&mut self, bucket: usize, offset: usize) -> Result<()> {
        let size = self.buckets.get(bucket).map_or(0, |b| b.len());
        if offset == 0 || offset >= size {
            return Err(Error::InvalidSplit {
                bucket,
                offset,
                size,
            });
        }
        let tail: Bucket<T> = self.buckets[bucket].drain(offset..).collect();
        self.buckets.insert(bucket + 1, tail);
        Ok(())
    }

    #[inline]
    fn items_before(&self, bucket: usize) -> usize {
        self.buckets[..bucket].iter().map(|b| b.len()).sum()
    }

    /// Places `item` as a new singleton bucket at `position` in `[0, len]`.
    fn place_at(&mut self, item: T, position: usize) -> Result<usize> {
        let at = if position == self.len {
            self.buckets.len()
        } else {
            let (bucket, offset) = self.coords(position)?;
            if offset == 0 {
                bucket
            } else {
                self.split_bucket(bucket, offset)?;
                bucket + 1
            }
        };
        self.buckets.insert(at, smallvec![item]);
        self.len += 1;
        Ok(at)
    }

    /// Detaches the item at `(bucket, offset)`, dropping the bucket if it empties.
    fn take(&mut self, bucket: usize, offset: usize) -> (T, bool) {
        let item = self.buckets[bucket].remove(offset);
        self.len -= 1;
        let dropped = self.buckets[bucket].is_empty();
        if dropped {
            self.buckets.remove(bucket);
        }
        (item, dropped)
    }
}

impl<T: Clone> BucketedRanking<T> {
    fn items_from(&self, bucket: usize) -> Vec<(T, usize)> {
        self.buckets
            .iter()
            .enumerate()
            .skip(bucket)
            .flat_map(|(idx, b)| b.iter().map(move |item| (item.clone(), idx)))
            .collect()
    }

    /// Inserts by binary search over bucket representatives.
    ///
    /// A tie joins the probed bucket. Otherwise a singleton bucket is created
    /// and every later item is reported as shifted. An undecidable probe
    /// aborts the insert without touching the ranking.
    pub fn binary_insert<O>(&mut self, item: T, oracle: &mut O) -> Result<Placement<T>>
    where
        O: Oracle<T> + ?Sized,
    {
        let mut low = 0usize;
        let mut high = self.buckets.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let verdict = oracle.compare(&item, &self.buckets[mid][0]);
            tracing::trace!(bucket = mid, ?verdict, "Probed bucket representative.");
            match verdict {
                Verdict::Tie => {
                    self.buckets[mid].push(item);
                    self.len += 1;
                    return Ok(Placement {
                        bucket: mid,
                        shifted: Vec::new(),
                    });
                }
                Verdict::CandidatePreferred => high = mid,
                Verdict::RepresentativePreferred => low = mid + 1,
                Verdict::Undecidable => return Err(Error::Undecidable { bucket: mid }),
            }
        }
        self.buckets.insert(low, smallvec![item]);
        self.len += 1;
        Ok(Placement {
            bucket: low,
            shifted: self.items_from(low + 1),
        })
    }

    /// Inserts at linear `position` in `[0, len]` as a new singleton bucket.
    ///
    /// A position inside a bucket splits it around the new item; an explicit
    /// position never joins an existing tie.
    pub fn direct_insert(&mut self, item: T, position: usize) -> Result<Placement<T>> {
        if position > self.len {
            return Err(Error::PositionOutOfRange {
                position,
                len: self.len,
            });
        }
        let bucket = self.place_at(item, position)?;
        Ok(Placement {
            bucket,
            shifted: self.items_from(bucket + 1),
        })
    }
}

impl<T: PartialEq> BucketedRanking<T> {
    fn offset_of(&self, item: &T, bucket: usize) -> Option<usize> {
        self.buckets.get(bucket)?.iter().position(|m| m == item)
    }

    /// Linear position of `item`, which must live in `bucket`.
    pub fn linear_position(&self, item: &T, bucket: usize) -> Option<usize> {
        let offset = self.offset_of(item, bucket)?;
        Some(self.items_before(bucket) + offset)
    }
}

impl<T: Clone + PartialEq> BucketedRanking<T> {
    /// Removes `item` from `bucket`.
    ///
    /// Returns `None` when the bucket does not hold the item.
    pub fn remove(&mut self, item: &T, bucket: usize) -> Option<Removal<T>> {
        let offset = self.offset_of(item, bucket)?;
        let (_, dropped) = self.take(bucket, offset);
        if dropped {
            Some(Removal {
                bucket: None,
                shifted: self.items_from(bucket),
            })
        } else {
            Some(Removal {
                bucket: Some(bucket),
                shifted: Vec::new(),
            })
        }
    }

    /// Moves `item` so it sits immediately before whatever currently occupies
    /// linear `position`, or last when `position == len`.
    ///
    /// Returns `Ok(None)` when `current_bucket` does not hold the item.
    pub fn move_item(
        &mut self,
        item: &T,
        current_bucket: usize,
        position: usize,
    ) -> Result<Option<Placement<T>>> {
        let Some(offset) = self.offset_of(item, current_bucket) else {
            return Ok(None);
        };
        if position > self.len {
            return Err(Error::PositionOutOfRange {
                position,
                len: self.len,
            });
        }
        let current = self.items_before(current_bucket) + offset;
        if current == position {
            return Ok(Some(Placement {
                bucket: current_bucket,
                shifted: Vec::new(),
            }));
        }
        // Everything behind the source slides left by one once it is detached.
        let target = if position > current {
            position - 1
        } else {
            position
        };
        let (moved, _) = self.take(current_bucket, offset);
        let bucket = self.place_at(moved, target)?;
        let first = current_bucket.min(bucket);
        let mut shifted = self.items_from(first);
        shifted.retain(|(m, idx)| !(*idx == bucket && m == item));
        Ok(Some(Placement { bucket, shifted }))
    }
}
