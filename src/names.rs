/// Special-character replacements applied to player names, in application
/// order. Each step lower-cases the text before replacing, so later rules see
/// the output of earlier ones.
pub const CHAR_REPLACEMENTS: &[(&str, &str)] = &[
    ("-", " "),
    ("ö", "o"),
    ("ó", "o"),
    ("ò", "o"),
    ("í", "i"),
    ("é", "e"),
    ("ä", "a"),
    ("ü", "u"),
    ("ß", "ss"),
    ("å", "a"),
    ("ø", "o"),
    ("ñ", "n"),
    ("ç", "c"),
    ("œ", "oe"),
    ("æ", "ae"),
    ("ė", "e"),
    ("ż", "z"),
    ("ł", "l"),
    ("č", "c"),
    ("ś", "s"),
    ("ź", "z"),
    ("ã", "a"),
    ("į", "i"),
    ("š", "s"),
    ("ž", "z"),
    ("đ", "d"),
    ("ć", "c"),
    ("ț", "t"),
    ("ğ", "g"),
    ("ş", "s"),
    ("î", "i"),
    ("ă", "a"),
    ("Ș", "S"),
    ("Ț", "T"),
    ("İ", "I"),
    ("ı", "i"),
    ("ё", "e"),
    ("й", "i"),
    ("ю", "u"),
    ("я", "ya"),
    ("ë", "e"),
    ("ș", "s"),
    ("ţ", "t"),
    ("ï", "i"),
];

pub fn normalize_name(input: &str) -> String {
    replace_special_chars(input, CHAR_REPLACEMENTS)
}

pub fn replace_special_chars(text: &str, replacements: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for (special, plain) in replacements {
        out = out.to_lowercase().replace(special, plain);
    }
    out
}
