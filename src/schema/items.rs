// src/schema/items.rs
//
// Built-in item tables for the supported filing types. Ordering is
// significant: it encodes the expected sequential appearance of items in a
// well-formed document and drives boundary resolution.

/// One row of a built-in schema table, compiled into an `ItemSpec` at
/// registry construction time.
pub(crate) struct ItemDef {
    /// Stable item identifier (e.g. "1A", "part_1__2", "9.01").
    pub id: &'static str,
    /// The number as it appears in headings ("Item <number>").
    pub number: &'static str,
    /// Canonical display name.
    pub title: &'static str,
    /// Known synonym/shortened headings, matched in addition to `title`.
    pub synonyms: &'static [&'static str],
    pub required: bool,
}

const fn def(
    id: &'static str,
    number: &'static str,
    title: &'static str,
    synonyms: &'static [&'static str],
    required: bool,
) -> ItemDef {
    ItemDef { id, number, title, synonyms, required }
}

/// Annual report (10-K) items.
pub(crate) const ANNUAL_REPORT_ITEMS: &[ItemDef] = &[
    def("1", "1", "Business", &["Description of Business"], true),
    def("1A", "1A", "Risk Factors", &[], false),
    def("1B", "1B", "Unresolved Staff Comments", &[], false),
    def("1C", "1C", "Cybersecurity", &[], false),
    def("2", "2", "Properties", &["Description of Property"], false),
    def("3", "3", "Legal Proceedings", &[], false),
    def("4", "4", "Mine Safety Disclosures", &["Submission of Matters to a Vote of Security Holders"], false),
    def(
        "5",
        "5",
        "Market for Registrant's Common Equity, Related Stockholder Matters and Issuer Purchases of Equity Securities",
        &["Market for the Registrant's Common Equity", "Market for Common Equity"],
        false,
    ),
    def("6", "6", "Selected Financial Data", &["Reserved", "[Reserved]"], false),
    def(
        "7",
        "7",
        "Management's Discussion and Analysis of Financial Condition and Results of Operations",
        &["Management's Discussion and Analysis"],
        true,
    ),
    def("7A", "7A", "Quantitative and Qualitative Disclosures About Market Risk", &[], false),
    def("8", "8", "Financial Statements and Supplementary Data", &["Consolidated Financial Statements"], true),
    def(
        "9",
        "9",
        "Changes in and Disagreements with Accountants on Accounting and Financial Disclosure",
        &["Changes in and Disagreements with Accountants"],
        false,
    ),
    def("9A", "9A", "Controls and Procedures", &[], false),
    def("9B", "9B", "Other Information", &[], false),
    def("9C", "9C", "Disclosure Regarding Foreign Jurisdictions that Prevent Inspections", &[], false),
    def("10", "10", "Directors, Executive Officers and Corporate Governance", &["Directors and Executive Officers"], false),
    def("11", "11", "Executive Compensation", &[], false),
    def(
        "12",
        "12",
        "Security Ownership of Certain Beneficial Owners and Management and Related Stockholder Matters",
        &["Security Ownership of Certain Beneficial Owners"],
        false,
    ),
    def(
        "13",
        "13",
        "Certain Relationships and Related Transactions, and Director Independence",
        &["Certain Relationships and Related Transactions"],
        false,
    ),
    def("14", "14", "Principal Accountant Fees and Services", &["Principal Accounting Fees and Services"], false),
    def(
        "15",
        "15",
        "Exhibits, Financial Statement Schedules",
        &["Exhibits and Financial Statement Schedules", "Exhibits, Financial Statement Schedules and Reports"],
        false,
    ),
    def("16", "16", "Form 10-K Summary", &[], false),
];

/// Quarterly report (10-Q) items. The flat ordering interleaves Part I and
/// Part II; number collisions between parts ("Item 1" appears in both) are
/// disambiguated by title patterns and ordering during resolution.
pub(crate) const QUARTERLY_REPORT_ITEMS: &[ItemDef] = &[
    def("part_1__1", "1", "Financial Statements", &["Condensed Consolidated Financial Statements"], true),
    def(
        "part_1__2",
        "2",
        "Management's Discussion and Analysis of Financial Condition and Results of Operations",
        &["Management's Discussion and Analysis"],
        true,
    ),
    def("part_1__3", "3", "Quantitative and Qualitative Disclosures About Market Risk", &[], false),
    def("part_1__4", "4", "Controls and Procedures", &[], false),
    def("part_2__1", "1", "Legal Proceedings", &[], false),
    def("part_2__1A", "1A", "Risk Factors", &[], false),
    def(
        "part_2__2",
        "2",
        "Unregistered Sales of Equity Securities and Use of Proceeds",
        &["Unregistered Sales of Equity Securities", "Changes in Securities"],
        false,
    ),
    def("part_2__3", "3", "Defaults Upon Senior Securities", &[], false),
    def("part_2__4", "4", "Mine Safety Disclosures", &["Submission of Matters to a Vote of Security Holders"], false),
    def("part_2__5", "5", "Other Information", &[], false),
    def("part_2__6", "6", "Exhibits", &["Exhibits and Reports on Form 8-K"], false),
];

/// Current report (8-K) items, post 2004-08-23 numbering.
pub(crate) const CURRENT_REPORT_ITEMS: &[ItemDef] = &[
    def("1.01", "1.01", "Entry into a Material Definitive Agreement", &[], false),
    def("1.02", "1.02", "Termination of a Material Definitive Agreement", &[], false),
    def("1.03", "1.03", "Bankruptcy or Receivership", &[], false),
    def("1.04", "1.04", "Mine Safety Reporting of Shutdowns and Patterns of Violations", &[], false),
    def("1.05", "1.05", "Material Cybersecurity Incidents", &[], false),
    def("2.01", "2.01", "Completion of Acquisition or Disposition of Assets", &[], false),
    def("2.02", "2.02", "Results of Operations and Financial Condition", &[], false),
    def(
        "2.03",
        "2.03",
        "Creation of a Direct Financial Obligation or an Obligation under an Off-Balance Sheet Arrangement of a Registrant",
        &["Creation of a Direct Financial Obligation"],
        false,
    ),
    def(
        "2.04",
        "2.04",
        "Triggering Events That Accelerate or Increase a Direct Financial Obligation",
        &[],
        false,
    ),
    def("2.05", "2.05", "Costs Associated with Exit or Disposal Activities", &[], false),
    def("2.06", "2.06", "Material Impairments", &[], false),
    def(
        "3.01",
        "3.01",
        "Notice of Delisting or Failure to Satisfy a Continued Listing Rule or Standard",
        &[],
        false,
    ),
    def("3.02", "3.02", "Unregistered Sales of Equity Securities", &[], false),
    def("3.03", "3.03", "Material Modification to Rights of Security Holders", &[], false),
    def("4.01", "4.01", "Changes in Registrant's Certifying Accountant", &[], false),
    def(
        "4.02",
        "4.02",
        "Non-Reliance on Previously Issued Financial Statements or a Related Audit Report",
        &[],
        false,
    ),
    def("5.01", "5.01", "Changes in Control of Registrant", &[], false),
    def(
        "5.02",
        "5.02",
        "Departure of Directors or Certain Officers",
        &["Departure of Directors or Principal Officers", "Election of Directors"],
        false,
    ),
    def(
        "5.03",
        "5.03",
        "Amendments to Articles of Incorporation or Bylaws",
        &["Change in Fiscal Year"],
        false,
    ),
    def(
        "5.04",
        "5.04",
        "Temporary Suspension of Trading Under Registrant's Employee Benefit Plans",
        &[],
        false,
    ),
    def("5.05", "5.05", "Amendments to the Registrant's Code of Ethics", &[], false),
    def("5.06", "5.06", "Change in Shell Company Status", &[], false),
    def("5.07", "5.07", "Submission of Matters to a Vote of Security Holders", &[], false),
    def("5.08", "5.08", "Shareholder Director Nominations", &[], false),
    def("6.01", "6.01", "ABS Informational and Computational Material", &[], false),
    def("6.02", "6.02", "Change of Servicer or Trustee", &[], false),
    def("6.03", "6.03", "Change in Credit Enhancement or Other External Support", &[], false),
    def("6.04", "6.04", "Failure to Make a Required Distribution", &[], false),
    def("6.05", "6.05", "Securities Act Updating Disclosure", &[], false),
    def("7.01", "7.01", "Regulation FD Disclosure", &[], false),
    def("8.01", "8.01", "Other Events", &[], false),
    def("9.01", "9.01", "Financial Statements and Exhibits", &[], false),
];

/// Current report (8-K) items as numbered before 2004-08-23.
pub(crate) const CURRENT_REPORT_LEGACY_ITEMS: &[ItemDef] = &[
    def("1", "1", "Changes in Control of Registrant", &[], false),
    def("2", "2", "Acquisition or Disposition of Assets", &[], false),
    def("3", "3", "Bankruptcy or Receivership", &[], false),
    def("4", "4", "Changes in Registrant's Certifying Accountant", &[], false),
    def("5", "5", "Other Events", &["Other Events and Regulation FD Disclosure"], false),
    def("6", "6", "Resignations of Registrant's Directors", &[], false),
    def("7", "7", "Financial Statements and Exhibits", &["Financial Statements, Pro Forma Financial Information and Exhibits"], false),
    def("8", "8", "Change in Fiscal Year", &[], false),
    def("9", "9", "Regulation FD Disclosure", &[], false),
    def("10", "10", "Amendments to the Registrant's Code of Ethics", &[], false),
    def("11", "11", "Temporary Suspension of Trading Under Registrant's Employee Benefit Plans", &[], false),
    def("12", "12", "Results of Operations and Financial Condition", &[], false),
];
