//! Layout of the 111-bin Monte Carlo weight vectors.
//!
//! The ordering is fixed upstream by the generator configuration:
//!
//! | bins     | content                                   |
//! |----------|-------------------------------------------|
//! | 1..=9    | QCD scale variations (bin 1 is nominal)   |
//! | 10..=109 | PDF replicas, sets 260001..=260100        |
//! | 110, 111 | alpha_s variations, sets 265000 / 266000  |

use std::fmt;
use std::ops::RangeInclusive;

/// Total number of weights per vector.
pub const N_WEIGHTS: usize = 111;
/// Nominal weight (muR = muF = 1).
pub const NOMINAL: usize = 1;
/// muR = muF = 2.
pub const QCD_SCALE_TWO: usize = 5;
/// muR = muF = 0.5.
pub const QCD_SCALE_HALF: usize = 9;
/// Bins holding the PDF replicas.
pub const PDF_REPLICAS: RangeInclusive<usize> = 10..=109;
/// Number of PDF replicas.
pub const N_PDF_REPLICAS: usize = 100;
/// alpha_s variation, PDF set 265000.
pub const ALPHA_S_DOWN: usize = 110;
/// alpha_s variation, PDF set 266000.
pub const ALPHA_S_UP: usize = 111;

const QCD_SCALES: [(f64, f64); 9] = [
    (1.0, 1.0),
    (1.0, 2.0),
    (1.0, 0.5),
    (2.0, 1.0),
    (2.0, 2.0),
    (2.0, 0.5),
    (0.5, 1.0),
    (0.5, 2.0),
    (0.5, 0.5),
];
const FIRST_PDF_SET: u32 = 260001;
const ALPHA_S_SETS: [u32; 2] = [265000, 266000];

/// What a given weight bin represents.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Variation {
    Qcd { mu_r: f64, mu_f: f64 },
    PdfReplica { set_id: u32 },
    AlphaS { set_id: u32 },
}

impl Variation {
    /// Variation stored in 1-based `bin`, or `None` outside the layout.
    pub fn of_bin(bin: usize) -> Option<Self> {
        match bin {
            1..=9 => {
                let (mu_r, mu_f) = QCD_SCALES[bin - 1];
                Some(Variation::Qcd { mu_r, mu_f })
            }
            b if PDF_REPLICAS.contains(&b) => Some(Variation::PdfReplica {
                set_id: FIRST_PDF_SET + (b - PDF_REPLICAS.start()) as u32,
            }),
            ALPHA_S_DOWN | ALPHA_S_UP => Some(Variation::AlphaS {
                set_id: ALPHA_S_SETS[bin - ALPHA_S_DOWN],
            }),
            _ => None,
        }
    }

    /// Generator weight id as written in the LHE header.
    pub fn weight_id(bin: usize) -> Option<u32> {
        match Variation::of_bin(bin)? {
            Variation::Qcd { .. } => Some(1000 + bin as u32),
            _ => Some(2000 + (bin - QCD_SCALE_HALF) as u32),
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variation::Qcd { mu_r, mu_f } => write!(f, "muR={} muF={}", mu_r, mu_f),
            Variation::PdfReplica { set_id } | Variation::AlphaS { set_id } => {
                write!(f, "PDF set = {}", set_id)
            }
        }
    }
}

/// One line per bin, in the format of the upstream weight dictionary.
pub fn describe() -> String {
    (1..=N_WEIGHTS)
        .filter_map(|bin| {
            let variation = Variation::of_bin(bin)?;
            let id = Variation::weight_id(bin)?;
            Some(format!("[bin {:>4}]   <weight id=\"{}\"> {} </weight>", bin, id, variation))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
