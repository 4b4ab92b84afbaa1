/// Type of the values stored in a [`FieldSet`].
pub type FieldValue = u8;

/// Fixed-capacity bit set of values allowed by a single cron field.
///
/// Value `i` is a member of the set if and only if the field allows `i`.
/// Indices at or above [`capacity`](FieldSet::capacity) are never members.
///
/// Note that months are stored zero-based (`0` is January)
/// and Sunday is always stored as `0`, regardless of how they were written in the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldSet {
    bits: u64,
    capacity: FieldValue,
}

impl FieldSet {
    /// The largest supported capacity.
    pub const MAX_CAPACITY: FieldValue = 64;

    /// Creates an empty set which may hold values `0..capacity`.
    ///
    /// Capacity is silently limited by [`MAX_CAPACITY`](FieldSet::MAX_CAPACITY).
    #[inline]
    pub const fn new(capacity: FieldValue) -> Self {
        let capacity = if capacity > Self::MAX_CAPACITY {
            Self::MAX_CAPACITY
        } else {
            capacity
        };
        Self { bits: 0, capacity }
    }

    /// Returns the number of values this set is able to hold.
    #[inline]
    pub const fn capacity(&self) -> FieldValue {
        self.capacity
    }

    /// Adds `value` to the set. Values out of capacity are ignored.
    #[inline]
    pub fn set(&mut self, value: FieldValue) {
        if value < self.capacity {
            self.bits |= 1 << value;
        }
    }

    /// Removes `value` from the set.
    #[inline]
    pub fn clear(&mut self, value: FieldValue) {
        if value < self.capacity {
            self.bits &= !(1 << value);
        }
    }

    /// Returns `true` if `value` is a member of the set.
    #[inline]
    pub const fn contains(&self, value: FieldValue) -> bool {
        value < self.capacity && self.bits & (1 << value) != 0
    }

    /// Returns the smallest member which is greater than or equal to `from`.
    pub fn find_next_set(&self, from: FieldValue) -> Option<FieldValue> {
        if from >= self.capacity {
            return None;
        }

        let bits = self.bits & (u64::MAX << from);
        if bits == 0 {
            None
        } else {
            Some(bits.trailing_zeros() as FieldValue)
        }
    }

    /// Returns the largest member which is less than or equal to `from`.
    pub fn find_prev_set(&self, from: FieldValue) -> Option<FieldValue> {
        if self.capacity == 0 {
            return None;
        }

        let from = from.min(self.capacity - 1);
        let mask = if from >= 63 { u64::MAX } else { (1 << (from + 1)) - 1 };
        let bits = self.bits & mask;
        if bits == 0 {
            None
        } else {
            Some((63 - bits.leading_zeros()) as FieldValue)
        }
    }

    /// Returns the smallest member.
    #[inline]
    pub fn first(&self) -> Option<FieldValue> {
        self.find_next_set(0)
    }

    /// Returns the largest member.
    #[inline]
    pub fn last(&self) -> Option<FieldValue> {
        self.find_prev_set(FieldValue::MAX)
    }

    /// Returns the number of members.
    #[inline]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns `true` if the set has no members.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if every value within capacity is a member.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len() == self.capacity as usize
    }

    /// Iterates over members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FieldValue> + '_ {
        (0..self.capacity).filter(|value| self.contains(*value))
    }
}
