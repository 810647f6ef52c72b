// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Shared grammar sources for the parse and render benchmark groups.

#[derive(Clone, Copy)]
pub enum Case {
    Small,
    Clinical,
    WideBatch,
    ConfoundHeavy,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Clinical => "clinical",
            Case::WideBatch => "wide_batch",
            Case::ConfoundHeavy => "confound_heavy",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Case::Small => "Site(3) > Patient(20)",
            Case::Clinical => {
                "Site(3) > Patient[30 | 25 | 18] > Sample(2) × Treatment(2) > Cell(~5000) : CellType(35)"
            }
            Case::WideBatch => {
                "Run(8) == Site(4) > Subject(25) > Session(6) × Task(4) × Load(3)"
            }
            Case::ConfoundHeavy => {
                "Sequencer(2) ≈≈ {Lane(8) ≈≈ Day(4) ≈≈ Operator(3)} == Batch(6)"
            }
        }
    }
}
