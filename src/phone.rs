//! Phone number normalization and E.164 checks.
//!
//! Numbers typed on Arabic keyboards often use Arabic-Indic (`٠١٢…`) or
//! Extended Arabic-Indic (`۰۱۲…`) digits; [`normalize`] folds both to ASCII
//! before stripping formatting characters.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static E164_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("Invalid regex for E.164 number"));

/// ISO-3166 alpha-2 code to country calling code.
static COUNTRY_PHONE_CODES: &[(&str, &str)] = &[
    ("AF", "93"), ("AL", "355"), ("DZ", "213"), ("AS", "1684"), ("AD", "376"), ("AO", "244"),
    ("AI", "1264"), ("AQ", "672"), ("AG", "1268"), ("AR", "54"), ("AM", "374"), ("AW", "297"),
    ("AU", "61"), ("AT", "43"), ("AZ", "994"), ("BS", "1242"), ("BH", "973"), ("BD", "880"),
    ("BB", "1246"), ("BY", "375"), ("BE", "32"), ("BZ", "501"), ("BJ", "229"), ("BM", "1441"),
    ("BT", "975"), ("BO", "591"), ("BA", "387"), ("BW", "267"), ("BR", "55"), ("IO", "246"),
    ("BN", "673"), ("BG", "359"), ("BF", "226"), ("BI", "257"), ("KH", "855"), ("CM", "237"),
    ("CA", "1"), ("CV", "238"), ("KY", "1345"), ("CF", "236"), ("TD", "235"), ("CL", "56"),
    ("CN", "86"), ("CO", "57"), ("KM", "269"), ("CG", "242"), ("CD", "243"), ("CR", "506"),
    ("HR", "385"), ("CU", "53"), ("CY", "357"), ("CZ", "420"), ("DK", "45"), ("DJ", "253"),
    ("DM", "1767"), ("DO", "1"), ("EC", "593"), ("EG", "20"), ("SV", "503"), ("GQ", "240"),
    ("ER", "291"), ("EE", "372"), ("ET", "251"), ("FJ", "679"), ("FI", "358"), ("FR", "33"),
    ("GA", "241"), ("GM", "220"), ("GE", "995"), ("DE", "49"), ("GH", "233"), ("GR", "30"),
    ("GD", "1473"), ("GT", "502"), ("GN", "224"), ("GW", "245"), ("GY", "592"), ("HT", "509"),
    ("HN", "504"), ("HU", "36"), ("IS", "354"), ("IN", "91"), ("ID", "62"), ("IR", "98"),
    ("IQ", "964"), ("IE", "353"), ("IL", "972"), ("IT", "39"), ("JM", "1876"), ("JP", "81"),
    ("JO", "962"), ("KZ", "7"), ("KE", "254"), ("KI", "686"), ("KP", "850"), ("KR", "82"),
    ("KW", "965"), ("KG", "996"), ("LA", "856"), ("LV", "371"), ("LB", "961"), ("LS", "266"),
    ("LR", "231"), ("LY", "218"), ("LI", "423"), ("LT", "370"), ("LU", "352"), ("MG", "261"),
    ("MW", "265"), ("MY", "60"), ("MV", "960"), ("ML", "223"), ("MT", "356"), ("MH", "692"),
    ("MR", "222"), ("MU", "230"), ("MX", "52"), ("FM", "691"), ("MD", "373"), ("MC", "377"),
    ("MN", "976"), ("ME", "382"), ("MA", "212"), ("MZ", "258"), ("MM", "95"), ("NA", "264"),
    ("NR", "674"), ("NP", "977"), ("NL", "31"), ("NZ", "64"), ("NI", "505"), ("NE", "227"),
    ("NG", "234"), ("NO", "47"), ("OM", "968"), ("PK", "92"), ("PW", "680"), ("PA", "507"),
    ("PG", "675"), ("PY", "595"), ("PE", "51"), ("PH", "63"), ("PL", "48"), ("PT", "351"),
    ("QA", "974"), ("RO", "40"), ("RU", "7"), ("RW", "250"), ("KN", "1869"), ("LC", "1758"),
    ("VC", "1784"), ("WS", "685"), ("SM", "378"), ("ST", "239"), ("SA", "966"), ("SN", "221"),
    ("RS", "381"), ("SC", "248"), ("SL", "232"), ("SG", "65"), ("SK", "421"), ("SI", "386"),
    ("SB", "677"), ("SO", "252"), ("ZA", "27"), ("SS", "211"), ("ES", "34"), ("LK", "94"),
    ("SD", "249"), ("SR", "597"), ("SE", "46"), ("CH", "41"), ("SY", "963"), ("TW", "886"),
    ("TJ", "992"), ("TZ", "255"), ("TH", "66"), ("TL", "670"), ("TG", "228"), ("TO", "676"),
    ("TT", "1868"), ("TN", "216"), ("TR", "90"), ("TM", "993"), ("UG", "256"), ("UA", "380"),
    ("AE", "971"), ("GB", "44"), ("US", "1"), ("UY", "598"), ("UZ", "998"), ("VU", "678"),
    ("VA", "379"), ("VE", "58"), ("VN", "84"), ("YE", "967"), ("ZM", "260"), ("ZW", "263"),
];

/// Returns the full ISO alpha-2 to calling-code table.
pub fn country_phone_codes() -> &'static [(&'static str, &'static str)] {
    COUNTRY_PHONE_CODES
}

/// Looks up the calling code for an ISO alpha-2 country code, ignoring case.
///
/// ```
/// assert_eq!(amwal::phone::phone_code_from_iso("sa"), Some("966"));
/// assert_eq!(amwal::phone::phone_code_from_iso("XX"), None);
/// ```
pub fn phone_code_from_iso(iso_code: &str) -> Option<&'static str> {
    COUNTRY_PHONE_CODES
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(iso_code.trim()))
        .map(|(_, code)| *code)
}

/// Returns `true` if the number, without its leading `+`, starts with any
/// known calling code.
///
/// The single-digit codes `1` and `7` match any number starting with those
/// digits, so this is a weak signal. Use [`longest_country_code_prefix`] to
/// learn which code actually matched.
pub fn has_country_code_prefix(phone: &str) -> bool {
    let digits = phone.trim_start_matches('+');
    COUNTRY_PHONE_CODES
        .iter()
        .any(|(_, code)| digits.starts_with(code))
}

/// Returns the longest calling code the number starts with.
///
/// ```
/// // Jamaica (1876) wins over the shared North American code 1.
/// assert_eq!(amwal::phone::longest_country_code_prefix("+18765550100"), Some("1876"));
/// assert_eq!(amwal::phone::longest_country_code_prefix("+966501234567"), Some("966"));
/// ```
pub fn longest_country_code_prefix(phone: &str) -> Option<&'static str> {
    let digits = phone.trim_start_matches('+');
    COUNTRY_PHONE_CODES
        .iter()
        .map(|(_, code)| *code)
        .filter(|code| digits.starts_with(code))
        .max_by_key(|code| code.len())
}

fn to_ascii_digit(c: char) -> Option<char> {
    let offset = match c {
        '0'..='9' => return Some(c),
        '\u{0660}'..='\u{0669}' => c as u32 - 0x0660,
        '\u{06F0}'..='\u{06F9}' => c as u32 - 0x06F0,
        _ => return None,
    };
    char::from_digit(offset, 10)
}

/// Folds Arabic-Indic digits to ASCII, drops every character other than digits
/// and a leading `+`, then strips leading zeros from numbers without a `+`.
///
/// ```
/// assert_eq!(amwal::phone::normalize("٠١٢٣"), "123");
/// assert_eq!(amwal::phone::normalize("+966 (50) 123-4567"), "+966501234567");
/// assert_eq!(amwal::phone::normalize("00966501234567"), "966501234567");
/// ```
pub fn normalize(phone: &str) -> String {
    let mut out = String::with_capacity(phone.len());
    for c in phone.chars() {
        if let Some(digit) = to_ascii_digit(c) {
            out.push(digit);
        } else if c == '+' && out.is_empty() {
            out.push(c);
        }
    }

    if out.starts_with('+') {
        out
    } else {
        out.trim_start_matches('0').to_string()
    }
}

/// `true` iff the string is `+` followed by 2 to 15 digits, the first non-zero.
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Normalizes the number and checks that the result is valid E.164.
///
/// # Errors
///
/// Returns a validation error if the normalized number is not E.164.
pub fn validate_phone(phone: &str) -> Result<String> {
    let normalized = normalize(phone);
    if !is_valid_e164(&normalized) {
        return Err(Error::validation("Invalid phone number format"));
    }
    Ok(normalized)
}
