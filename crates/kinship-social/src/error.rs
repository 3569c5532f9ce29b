//! Error types for the kinship-social crate.
//!
//! Relationship generation itself never fails: duplicates and rejected
//! candidates are ordinary skips. The only fallible step is creating a
//! child, which [`InheritingChildFactory`](crate::InheritingChildFactory)
//! reports through [`ChildError`].

use chrono::NaiveDate;

use kinship_types::IndividualId;

/// Errors raised while creating a child for a couple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChildError {
    /// The mother was younger than the minimum conception age on the
    /// reference date, leaving no valid birth year to sample.
    #[error("mother {mother} is {age_years} years old on {reference_date}, below the minimum conception age of {minimum_years}")]
    MotherTooYoung {
        /// The mother's id.
        mother: IndividualId,
        /// Her age in whole years on the reference date.
        age_years: u32,
        /// The minimum conception age.
        minimum_years: u32,
        /// The reference date of the generation pass.
        reference_date: NaiveDate,
    },

    /// The couple handed to the factory was not one male and one female.
    #[error("couple {first} and {second} is not an opposite-sex couple")]
    NotAnOppositeSexCouple {
        /// First member of the couple.
        first: IndividualId,
        /// Second member of the couple.
        second: IndividualId,
    },

    /// A computed birth date fell outside the representable calendar.
    #[error("birth date out of range: {context}")]
    DateOutOfRange {
        /// Description of what was being computed.
        context: String,
    },
}
