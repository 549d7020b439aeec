//! Country name -> optimization engine country code

const COUNTRY_CODES: &[(&str, &str)] = &[
    ("ARGENTINA", "AR"),
    ("SPAIN", "ES"),
    ("SOUTH KOREA", "KR"),
    ("BRAZIL", "BR"),
    ("NETHERLANDS", "NL"),
    ("TURKEY", "TR"),
    ("JAPAN", "JP"),
    ("SAUDI ARABIA", "GC"),
    ("FRANCE", "FR"),
    ("ITALY", "IT"),
    ("BELGIUM", "BE"),
    ("GERMANY", "DE"),
    ("SWEDEN", "SE"),
    ("POLAND", "PL"),
    ("MEXICO", "MX"),
    ("AUSTRALIA", "AU"),
    ("CANADA", "CA"),
    ("COLOMBIA", "CO"),
    ("UAE", "UAE"),
];

pub struct CountryCodes;

impl CountryCodes {
    /// Case-insensitive lookup; `None` for countries the engine does not know
    pub fn code_for(country: &str) -> Option<&'static str> {
        let country = country.trim().to_uppercase();
        COUNTRY_CODES
            .iter()
            .find(|(name, _)| *name == country)
            .map(|(_, code)| *code)
    }
}
