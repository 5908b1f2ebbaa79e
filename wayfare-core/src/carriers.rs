/// Display names for the validating-carrier codes that dominate search
/// results. Codes without an entry pass through unchanged, so an exotic or
/// brand-new carrier still renders as its two-letter code.
pub fn display_name(code: &str) -> &str {
    match code {
        "AA" => "American Airlines",
        "AC" => "Air Canada",
        "AF" => "Air France",
        "AS" => "Alaska Airlines",
        "AY" => "Finnair",
        "AZ" => "ITA Airways",
        "B6" => "JetBlue Airways",
        "BA" => "British Airways",
        "CX" => "Cathay Pacific",
        "DL" => "Delta Air Lines",
        "EI" => "Aer Lingus",
        "EK" => "Emirates",
        "EY" => "Etihad Airways",
        "F9" => "Frontier Airlines",
        "IB" => "Iberia",
        "JL" => "Japan Airlines",
        "KL" => "KLM Royal Dutch Airlines",
        "LH" => "Lufthansa",
        "LX" => "Swiss International Air Lines",
        "NH" => "All Nippon Airways",
        "NK" => "Spirit Airlines",
        "OS" => "Austrian Airlines",
        "QF" => "Qantas",
        "QR" => "Qatar Airways",
        "SK" => "SAS Scandinavian Airlines",
        "SQ" => "Singapore Airlines",
        "TK" => "Turkish Airlines",
        "TP" => "TAP Air Portugal",
        "UA" => "United Airlines",
        "VS" => "Virgin Atlantic",
        "WN" => "Southwest Airlines",
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_carrier_mapped() {
        assert_eq!(display_name("AA"), "American Airlines");
        assert_eq!(display_name("SQ"), "Singapore Airlines");
    }

    #[test]
    fn test_unknown_carrier_passes_through() {
        assert_eq!(display_name("ZZ"), "ZZ");
        assert_eq!(display_name("N/A"), "N/A");
    }
}
