//! Programme code table
//!
//! Results rows carry the long programme code; spreadsheets usually carry the
//! short one.

use phf::phf_map;
use std::borrow::Cow;

/// Short code → long code. Keys are upper case.
static PROGRAMME_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "AIBH" => "TMSARTSINT03",
    "AISD" => "TMSARTSINT02",
    "AIDE" => "TMSCOMSSAD18",
    "ISEC" => "TMSCOMSINF01",
    "CF" => "TMSCOMSCFI01",
    "FRM" => "TMSCOMSFRM01",
    "FT" => "TMSFINSTEC01",
    "EDT" => "TMSCOMSEDT01",
    "ML" => "TMSCOMSMCL01",
    "DSML" => "TMSDATSMLE01",
    "CSML" => "TMSCOMSSML01",
    "RAI" => "TMSROBAARI01",
    "SEIOT" => "TMSCOMSEIT01",
    "DDI" => "TMSCOMSDDI19",
    "CS" => "TMSCOMSING01",
    "SSE" => "TMSCOMSSSE01",
    "CGVI" => "TMSCOMSCGV01",
};

/// Maps a programme code to the token searched for in result rows.
///
/// Unknown codes (and the empty string) come back trimmed but otherwise
/// unchanged.
pub fn resolve_search_token(programme_code: &str) -> Cow<'_, str> {
    let code = programme_code.trim();
    match PROGRAMME_CODES.get(code.to_ascii_uppercase().as_str()) {
        Some(long) => Cow::Borrowed(*long),
        None => Cow::Borrowed(code),
    }
}

/// All known mappings
pub fn programme_codes() -> impl Iterator<Item = (&'static str, &'static str)> {
    PROGRAMME_CODES.entries().map(|(short, long)| (*short, *long))
}
