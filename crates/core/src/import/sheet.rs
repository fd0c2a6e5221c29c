use std::io::Read;

use crate::errors::CoreError;
use crate::models::holding::{GrandTotal, Holding, HoldingsDocument, Metric, Sector};

/// Fixed column positions of the brokerage worksheet.
mod col {
    pub const NO: usize = 0;
    pub const PARTICULARS: usize = 1;
    pub const PURCHASE_PRICE: usize = 2;
    pub const QTY: usize = 3;
    pub const INVESTMENT: usize = 4;
    pub const PORTFOLIO_FRACTION: usize = 5;
    pub const SYMBOL: usize = 6;
    pub const CMP: usize = 7;
    pub const PRESENT_VALUE: usize = 8;
    pub const GAIN_LOSS: usize = 9;
    pub const GAIN_LOSS_FRACTION: usize = 10;
    pub const MARKET_CAP: usize = 11;
    pub const PE_RATIO: usize = 12;
    pub const LATEST_EARNINGS: usize = 13;
    pub const REVENUE_TTM: usize = 14;
    pub const EBITDA_TTM: usize = 15;
    pub const EBITDA_PERCENT: usize = 16;
    pub const PAT: usize = 17;
    pub const PAT_PERCENT: usize = 18;
    pub const CFO_MARCH24: usize = 19;
    pub const CFO_5_YEARS: usize = 20;
    pub const FREE_CASH_FLOW: usize = 21;
    pub const DEBT_TO_EQUITY: usize = 22;
    pub const BOOK_VALUE: usize = 23;
    pub const REVENUE_GROWTH: usize = 24;
    pub const EBITDA_GROWTH: usize = 25;
    pub const PROFIT_GROWTH: usize = 26;
    pub const MARKET_CAP2: usize = 27;
    pub const PRICE_TO_SALES: usize = 28;
    pub const CFO_TO_EBITDA: usize = 29;
    pub const CFO_TO_PAT: usize = 30;
    pub const PRICE_TO_BOOK: usize = 31;
    pub const STAGE2: usize = 32;
    pub const SALE_PRICE: usize = 33;
    pub const COMMENTARY: usize = 34;
    pub const TOTAL_SALE_PRICE: usize = 35;
}

const UNCATEGORIZED: &str = "Uncategorized";

/// One worksheet row with lenient typed accessors.
struct Row<'a> {
    cells: &'a [String],
}

impl<'a> Row<'a> {
    fn raw(&self, idx: usize) -> &'a str {
        self.cells.get(idx).map(|c| c.trim()).unwrap_or("")
    }

    fn text(&self, idx: usize) -> String {
        self.raw(idx).to_string()
    }

    /// Numeric cell; empty or non-numeric reads as 0.
    fn num(&self, idx: usize) -> f64 {
        parse_number(self.raw(idx)).unwrap_or(0.0)
    }

    /// Fraction cell (0.125) rendered as a percentage (12.5). Cells already
    /// formatted as "12.5%" are taken as-is.
    fn percent(&self, idx: usize) -> f64 {
        let raw = self.raw(idx);
        match raw.strip_suffix('%') {
            Some(pct) => parse_number(pct).unwrap_or(0.0),
            None => parse_number(raw).unwrap_or(0.0) * 100.0,
        }
    }

    fn metric(&self, idx: usize) -> Metric {
        let raw = self.raw(idx);
        match parse_number(raw) {
            Some(n) => Metric::Number(n),
            None => Metric::Text(raw.to_string()),
        }
    }

    /// Row number, when the "No" column holds any number.
    fn row_no(&self) -> Option<f64> {
        parse_number(self.raw(col::NO))
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }
    raw.replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Build a holdings document from a CSV export of the portfolio worksheet.
pub fn read_holdings_csv<R: Read>(reader: R) -> Result<HoldingsDocument, CoreError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(parse_rows(&rows))
}

/// Classify worksheet rows into holdings, sector headers, the grand total and
/// the realised-sale footer.
///
/// Rows that match none of these (titles, blank lines, column headers) are
/// skipped.
pub fn parse_rows(rows: &[Vec<String>]) -> HoldingsDocument {
    let mut document = HoldingsDocument::default();

    for cells in rows {
        let row = Row { cells };
        let name = row.raw(col::PARTICULARS);
        let no_empty = row.raw(col::NO).is_empty();

        if let Some(no) = row.row_no() {
            if !name.is_empty() {
                let holding = parse_holding(&row, no);
                match document.sectors.last_mut() {
                    Some(sector) => sector.holdings.push(holding),
                    None => {
                        let mut sector = Sector::new(UNCATEGORIZED);
                        sector.holdings.push(holding);
                        document.sectors.push(sector);
                    }
                }
                continue;
            }
        }

        if no_empty && !name.is_empty() && name != "Particulars" && !name.contains("Market Cap") {
            if row.num(col::INVESTMENT) > 0.0 || row.num(col::GAIN_LOSS) != 0.0 {
                document.sectors.push(Sector {
                    sector_name: name.to_string(),
                    investment: row.num(col::INVESTMENT),
                    present_value: row.num(col::PRESENT_VALUE),
                    gain_loss: row.num(col::GAIN_LOSS),
                    gain_loss_percent: row.percent(col::GAIN_LOSS_FRACTION),
                    portfolio_percent: row.percent(col::PORTFOLIO_FRACTION),
                    holdings: Vec::new(),
                });
            }
            continue;
        }

        if no_empty && name.is_empty() && row.num(col::INVESTMENT) > 0.0 {
            document.grand_total = GrandTotal {
                investment: row.num(col::INVESTMENT),
                present_value: row.num(col::PRESENT_VALUE),
                gain_loss: row.num(col::GAIN_LOSS),
                gain_loss_percent: row.percent(col::GAIN_LOSS_FRACTION),
                portfolio_percent: row.percent(col::PORTFOLIO_FRACTION),
                total_sale_price: document.grand_total.total_sale_price,
            };
            continue;
        }

        let sale_total = row.num(col::TOTAL_SALE_PRICE);
        if sale_total != 0.0 {
            document.grand_total.total_sale_price = Some(sale_total);
        }
    }

    document
}

fn parse_holding(row: &Row<'_>, no: f64) -> Holding {
    Holding {
        no,
        particulars: row.text(col::PARTICULARS),
        symbol: row.raw(col::SYMBOL).to_uppercase(),
        purchase_price: row.num(col::PURCHASE_PRICE),
        qty: row.num(col::QTY),
        investment: row.num(col::INVESTMENT),
        portfolio_percent: row.percent(col::PORTFOLIO_FRACTION),
        cmp: row.num(col::CMP),
        present_value: row.num(col::PRESENT_VALUE),
        gain_loss: row.num(col::GAIN_LOSS),
        gain_loss_percent: row.percent(col::GAIN_LOSS_FRACTION),
        market_cap: row.num(col::MARKET_CAP),
        pe_ratio: row.num(col::PE_RATIO),
        latest_earnings: row.num(col::LATEST_EARNINGS),
        revenue_ttm: row.num(col::REVENUE_TTM),
        ebitda_ttm: row.num(col::EBITDA_TTM),
        ebitda_percent: row.metric(col::EBITDA_PERCENT),
        pat: row.num(col::PAT),
        pat_percent: row.metric(col::PAT_PERCENT),
        cfo_march24: row.num(col::CFO_MARCH24),
        cfo_5_years: row.num(col::CFO_5_YEARS),
        free_cash_flow: row.num(col::FREE_CASH_FLOW),
        debt_to_equity: row.num(col::DEBT_TO_EQUITY),
        book_value: row.num(col::BOOK_VALUE),
        revenue_growth: row.metric(col::REVENUE_GROWTH),
        ebitda_growth: row.metric(col::EBITDA_GROWTH),
        profit_growth: row.metric(col::PROFIT_GROWTH),
        market_cap2: row.num(col::MARKET_CAP2),
        price_to_sales: row.num(col::PRICE_TO_SALES),
        cfo_to_ebitda: row.metric(col::CFO_TO_EBITDA),
        cfo_to_pat: row.metric(col::CFO_TO_PAT),
        price_to_book: row.num(col::PRICE_TO_BOOK),
        stage2: row.text(col::STAGE2),
        sale_price: row.num(col::SALE_PRICE),
        commentary: row.text(col::COMMENTARY),
    }
}
