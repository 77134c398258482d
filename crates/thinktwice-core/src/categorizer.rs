//! Keyword-based expense categorization
//!
//! Maps a free-text merchant or description to a category label by scanning
//! [`CATEGORY_RULES`] in order. The first keyword found as a substring wins, so
//! the table order is a priority order: a merchant that mentions both "cafe"
//! and "amazon" is Food, because food is checked before shopping.

/// Label for empty or missing merchant text
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Label for merchant text that matched no keyword
pub const OTHER: &str = "Other";

/// Ordered (category, keywords) pairs. Keywords are lower-case.
pub const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "food",
        &[
            "zomato",
            "swiggy",
            "ubereats",
            "restaurant",
            "cafe",
            "starbucks",
            "mcdonalds",
            "kfc",
            "pizza",
            "burger",
        ],
    ),
    (
        "shopping",
        &[
            "amazon", "flipkart", "myntra", "ajio", "shopify", "store", "retail", "mart",
        ],
    ),
    (
        "transport",
        &[
            "uber", "ola", "rapido", "metro", "bus", "fuel", "petrol", "railway", "irctc",
        ],
    ),
    (
        "entertainment",
        &[
            "netflix",
            "spotify",
            "prime",
            "hotstar",
            "cinema",
            "movie",
            "bookmyshow",
        ],
    ),
    (
        "utilities",
        &[
            "electricity",
            "water",
            "gas",
            "recharge",
            "bill",
            "internet",
            "broadband",
            "jio",
            "airtel",
        ],
    ),
    (
        "health",
        &[
            "pharmacy", "apollo", "hospital", "clinic", "medplus", "doctor", "medical",
        ],
    ),
    (
        "income",
        &["salary", "credited", "payroll", "interest", "dividend"],
    ),
];

/// Categorize merchant text.
///
/// Pure and deterministic. Empty (or whitespace-only) input yields
/// [`UNCATEGORIZED`]; input that matches nothing yields [`OTHER`].
pub fn categorize(text: &str) -> String {
    if text.trim().is_empty() {
        return UNCATEGORIZED.to_string();
    }

    let lowered = text.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return capitalize(category);
        }
    }

    OTHER.to_string()
}

/// Categorize an optional merchant, treating `None` like empty text
pub fn categorize_opt(text: Option<&str>) -> String {
    text.map(categorize)
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_merchants() {
        assert_eq!(categorize("Zomato Order"), "Food");
        assert_eq!(categorize("AMAZON PAY INDIA"), "Shopping");
        assert_eq!(categorize("Uber trip 24 Jan"), "Transport");
        assert_eq!(categorize("Netflix subscription"), "Entertainment");
        assert_eq!(categorize("Airtel postpaid"), "Utilities");
        assert_eq!(categorize("Apollo Pharmacy"), "Health");
        assert_eq!(categorize("SALARY CREDIT ACME"), "Income");
    }

    #[test]
    fn test_empty_and_unmatched() {
        assert_eq!(categorize(""), UNCATEGORIZED);
        assert_eq!(categorize("   "), UNCATEGORIZED);
        assert_eq!(categorize_opt(None), UNCATEGORIZED);
        assert_eq!(categorize("Acme Consulting LLP"), OTHER);
    }

    #[test]
    fn test_first_match_wins() {
        // food precedes shopping
        assert_eq!(categorize("Amazon cafe voucher"), "Food");
        // "swiggy" and "mart" both appear; food is checked first
        assert_eq!(categorize("Swiggy Instamart"), "Food");
        // substring match: "ola" inside "cola" is transport, nothing earlier matches
        assert_eq!(categorize("Coca Cola"), "Transport");
    }

    #[test]
    fn test_deterministic() {
        let text = "Starbucks Koramangala";
        assert_eq!(categorize(text), categorize(text));
    }

    #[test]
    fn test_table_order_is_fixed() {
        let names: Vec<&str> = CATEGORY_RULES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "food",
                "shopping",
                "transport",
                "entertainment",
                "utilities",
                "health",
                "income"
            ]
        );
        for (_, keywords) in CATEGORY_RULES {
            for kw in *keywords {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }
}
