/// Region identifier column (ZIP code as text)
pub const REGION: &str = "REGION";

pub const SOLD_ABOVE_LIST: &str = "SOLD_ABOVE_LIST";
pub const PENDING_SALES_YOY: &str = "PENDING_SALES_YOY";
pub const AVG_SALE_TO_LIST: &str = "AVG_SALE_TO_LIST";
pub const MEDIAN_DOM: &str = "MEDIAN_DOM";

pub const MEDIAN_SALE_PRICE: &str = "MEDIAN_SALE_PRICE";
pub const MEDIAN_SALE_PRICE_YOY: &str = "MEDIAN_SALE_PRICE_YOY";
pub const HOMES_SOLD: &str = "HOMES_SOLD";
pub const HOMES_SOLD_YOY: &str = "HOMES_SOLD_YOY";
pub const PENDING_SALES: &str = "PENDING_SALES";
pub const INVENTORY: &str = "INVENTORY";
pub const INVENTORY_YOY: &str = "INVENTORY_YOY";

pub const PERIOD_BEGIN: &str = "PERIOD_BEGIN";
pub const PERIOD_END: &str = "PERIOD_END";
pub const STATE_CODE: &str = "STATE_CODE";

/// Derived by the score calculator
pub const MARKET_SCORE: &str = "MARKET_SCORE";
pub const ADJUSTED_LTV: &str = "ADJUSTED_LTV";

/// Features every scoring batch must carry
pub const REQUIRED_FEATURES: [&str; 4] = [
    SOLD_ABOVE_LIST,
    PENDING_SALES_YOY,
    AVG_SALE_TO_LIST,
    MEDIAN_DOM,
];

/// Days on market: lower is better, so it is inverted after rescaling
pub const INVERTED_FEATURES: [&str; 1] = [MEDIAN_DOM];
