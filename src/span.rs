/*
 * Copyright 2018-2024 Felix Garcia Carballeira, Alejandro Calderon Mateos, Diego Camarmas Alonso,
 * Álvaro Guerrero Espinosa
 *
 * This file is part of CREATOR.
 *
 * CREATOR is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Lesser General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * CREATOR is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public License
 * along with CREATOR.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Module containing the definition of the spans used to track regions of the VM source code
//! throughout the crate

/// Range of characters in the source code of a translation unit
pub type Span = std::ops::Range<usize>;
/// Value with an attached [`Span`]
pub type Spanned<T> = (T, Span);

/// Shifts a span relative to a line so that it becomes relative to the whole unit source
///
/// # Parameters
///
/// * `span`: span relative to the start of the line
/// * `offset`: character offset of the start of the line in the unit source
#[must_use]
pub const fn shift(span: Span, offset: usize) -> Span {
    (span.start + offset)..(span.end + offset)
}

#[cfg(test)]
mod test {
    use super::shift;

    #[test]
    fn shift_span() {
        assert_eq!(shift(0..4, 0), 0..4);
        assert_eq!(shift(2..5, 10), 12..15);
        assert_eq!(shift(3..3, 7), 10..10);
    }
}
