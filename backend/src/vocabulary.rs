//! CISAC lookup tables used when validating codes.
//!
//! Each table is built once on first use. A lookup has three outcomes:
//! blank, known, or unknown, and callers decide whether an unknown code
//! fails a work, gets blanked, or only produces a warning.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::record::CwrVersion;

/// Outcome of looking a code up in a [`CodeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Blank,
    Known,
    Unknown,
}

/// A named set of valid codes, introduced in a given CWR version.
#[derive(Debug)]
pub struct CodeTable {
    name: &'static str,
    since: CwrVersion,
    codes: HashSet<&'static str>,
}

impl CodeTable {
    fn new(name: &'static str, since: CwrVersion, codes: &'static str) -> Self {
        Self { name, since, codes: codes.split_whitespace().collect() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lookup(&self, code: &str) -> Lookup {
        let code = code.trim();
        if code.is_empty() {
            Lookup::Blank
        } else if self.codes.contains(code) {
            Lookup::Known
        } else {
            Lookup::Unknown
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lookup(code) == Lookup::Known
    }

    /// Whether records using this table exist in `version`.
    pub fn available_in(&self, version: CwrVersion) -> bool {
        version >= self.since
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

pub static TITLE_TYPES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Title Type", CwrVersion::V20, "AT TE FT IT OT TT PT RT ET OL AL"));

/// Title types that require a language code.
pub const LANGUAGE_TITLE_TYPES: [&str; 2] = ["OL", "AL"];

pub static LANGUAGES: Lazy<CodeTable> = Lazy::new(|| {
    CodeTable::new(
        "Language Code",
        CwrVersion::V20,
        "AA AB AE AF AK AM AN AR AS AV AY AZ BA BE BG BH BI BM BN BO BR BS CA CE CH CO CR CS \
         CU CV CY DA DE DV DZ EE EL EN EO ES ET EU FA FF FI FJ FO FR FY GA GD GL GN GU GV HA \
         HE HI HO HR HT HU HY HZ IA ID IE IG II IK IO IS IT IU JA JV KA KG KI KJ KK KL KM KN \
         KO KR KS KU KV KW KY LA LB LG LI LN LO LT LU LV MG MH MI MK ML MN MR MS MT MY NA NB \
         ND NE NG NL NN NO NR NV NY OC OJ OM OR OS PA PI PL PS PT QU RM RN RO RU RW SA SC SD \
         SE SG SI SK SL SM SN SO SQ SR SS ST SU SV SW TA TE TG TH TI TK TL TN TO TR TS TT TW \
         TY UG UK UR UZ VE VI VO WA WO XH YI YO ZA ZH ZU",
    )
});

pub static TEXT_MUSIC_RELATIONSHIPS: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Text Music Relationship", CwrVersion::V20, "MUS MTX TXT MTN"));

pub static INTENDED_PURPOSES: Lazy<CodeTable> = Lazy::new(|| {
    CodeTable::new("Intended Purpose", CwrVersion::V20, "COM FIL GEN LIB MUL RAD TEL THR VID")
});

pub static DISTRIBUTION_CATEGORIES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Musical Work Distribution Category", CwrVersion::V20, "JAZ POP SER UNC"));

pub static VERSION_TYPES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Version Type", CwrVersion::V20, "ORI MOD"));

pub static RECORDED_INDICATORS: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Recorded Indicator", CwrVersion::V20, "Y N U"));

pub static COMPOSITE_TYPES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Composite Type", CwrVersion::V20, "COS MED POT UCO"));

pub static EXCERPT_TYPES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Excerpt Type", CwrVersion::V20, "MOV UEX"));

pub static MUSIC_ARRANGEMENTS: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Music Arrangement", CwrVersion::V20, "NEW ARR ADM UNS ORI"));

pub static LYRIC_ADAPTATIONS: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Lyric Adaptation", CwrVersion::V20, "NEW MOD NON ORI REP ADL UNS TRA"));

pub static WORK_TYPES: Lazy<CodeTable> = Lazy::new(|| {
    CodeTable::new(
        "CWR Work Type",
        CwrVersion::V20,
        "TA AC AR AL AM BD BL CD CL CC CT DN FM FK BG SG JZ JG LN LA NA OP PK PP RP RK RB SD SY",
    )
});

/// Film and television music.
pub const FILM_WORK_TYPE: &str = "FM";

pub static TYPES_OF_RIGHT: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Type of Right", CwrVersion::V20, "MEC PER SYN ALL"));

pub static TRANSACTION_STATUSES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Transaction Status", CwrVersion::V20, "CO DU RA AS AC SR CR RJ NP NA"));

pub static IDENTIFIER_TYPES: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Identifier Type", CwrVersion::V22, "W R P V"));

pub static XREF_VALIDITY: Lazy<CodeTable> =
    Lazy::new(|| CodeTable::new("Cross Reference Validity", CwrVersion::V22, "Y U N"));
