//! PRN encoder
//!
//! The PRN file is a fixed-width positional format with no delimiters:
//!
//! | Field       | Offset | Format                                   |
//! |-------------|--------|------------------------------------------|
//! | fund ID     | 0      | decimal                                  |
//! | client code | 15     | text, `nan` when unmatched               |
//! | direction   | 34     | `A` or `R`                               |
//! | date        | 44     | source date with `.` replaced by `/`     |
//! | amount      | 69     | 15 chars, zero padded, 2 decimals, comma |
//!
//! Each line is a 100-column buffer of spaces. Fields are written left
//! aligned at their offset; a field that runs past the next offset is
//! overwritten by the next field, and anything past column 100 is dropped.
//! Trailing spaces are trimmed and every line ends with `\n`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::reconcile::Movement;

pub const LINE_WIDTH: usize = 100;
pub const FIELD_OFFSETS: [usize; 5] = [0, 15, 34, 44, 69];
pub const AMOUNT_WIDTH: usize = 15;

/// `15.03.2024` -> `15/03/2024`
pub fn format_date(date: &str) -> String {
    date.replace('.', "/")
}

/// `1500.5` -> `000000001500,50`
///
/// Rounds half to even on the exact value. A negative amount keeps its sign
/// in front of the zero padding, inside the 15 columns.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);

    let digits = rounded.to_string();
    // A negative amount that rounds to zero prints unsigned, unlike `%015.2f`
    let padded = if amount.is_sign_negative() && !rounded.is_zero() {
        format!("-{:0>width$}", digits, width = AMOUNT_WIDTH - 1)
    } else {
        format!("{:0>width$}", digits, width = AMOUNT_WIDTH)
    };

    padded.replace('.', ",")
}

/// One PRN line, without the trailing newline
pub fn encode_line(movement: &Movement) -> String {
    let fields = [
        movement.fund_id.to_string(),
        movement.client_code.to_string(),
        movement.direction.to_string(),
        format_date(&movement.date),
        format_amount(movement.amount),
    ];

    let mut line = [' '; LINE_WIDTH];
    for (offset, field) in FIELD_OFFSETS.iter().zip(fields.iter()) {
        for (slot, ch) in line.iter_mut().skip(*offset).zip(field.chars()) {
            *slot = ch;
        }
    }

    line.iter().collect::<String>().trim_end().to_string()
}

/// Encode all movements into the PRN text, one line per movement
pub fn encode<'a, I>(movements: I) -> String
where
    I: IntoIterator<Item = &'a Movement>,
{
    let mut out = String::new();
    for movement in movements {
        out.push_str(&encode_line(movement));
        out.push('\n');
    }
    out
}
