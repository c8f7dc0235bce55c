
mod test_dividend_lifecycle;
