// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use crate::model::{Factor, LevelCount};

/// Diagram label for a factor: `Name(3)`, `Name(5k)`, `Name(~2k)`,
/// `Name([30 | 25 | 18])`. Round thousands are shortened with `k`.
pub(crate) fn factor_label(factor: &Factor) -> String {
    let size = match factor.levels() {
        LevelCount::Fixed(n) => shorten(*n),
        LevelCount::Approximate(n) => format!("~{}", shorten(*n)),
        LevelCount::Unbalanced(counts) => {
            let parts: Vec<String> = counts.iter().map(|count| count.to_string()).collect();
            format!("[{}]", parts.join(" | "))
        }
    };
    format!("{}({})", factor.name(), size)
}

pub(crate) fn label_width(factor: &Factor) -> usize {
    factor_label(factor).chars().count()
}

fn shorten(n: u64) -> String {
    if n >= 1000 && n % 1000 == 0 {
        format!("{}k", n / 1000)
    } else {
        n.to_string()
    }
}
