//! 宏观数据抓取客户端
//!
//! 每个指标一到两次 HTTP 请求，结果整理为 markdown 表格。不做重试和缓存。

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::error::MacroDataError;
use super::indicator::{
    EastmoneyReport, Indicator, CPI_REPORT, MONEY_SUPPLY_REPORT, PPI_REPORT, RETAIL_REPORT,
    SOCIAL_FINANCING_COLUMNS,
};
use super::table::{convert_value, Cell, ColumnKind, Table};
use crate::config::MacroDataConfig;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.138 Safari/537.36";

const JIN10_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.149 Safari/537.36";

/// 金十 GDP 报告中的指标名
const GDP_REPORT_KEY: &str = "中国GDP年率报告";

/// 金十 GDP 报告中取用的值列
const GDP_VALUE_KIND: &str = "今值(%)";

pub struct MacroDataClient {
    http: Client,
    config: MacroDataConfig,
}

impl MacroDataClient {
    pub fn new(config: MacroDataConfig) -> Result<Self, MacroDataError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// 抓取指定指标，返回 markdown
    pub async fn fetch(&self, indicator: Indicator) -> Result<String, MacroDataError> {
        let table = self.fetch_table(indicator).await?;
        tracing::debug!(indicator = indicator.name(), rows = table.len(), "宏观数据抓取完成");
        Ok(table.to_markdown())
    }

    pub async fn fetch_table(&self, indicator: Indicator) -> Result<Table, MacroDataError> {
        match indicator {
            Indicator::SocialFinancing => self.social_financing().await,
            Indicator::GdpYearly => self.gdp_yearly().await,
            Indicator::Cpi => self.eastmoney_report(&CPI_REPORT).await,
            Indicator::Ppi => self.eastmoney_report(&PPI_REPORT).await,
            Indicator::MoneySupply => self.eastmoney_report(&MONEY_SUPPLY_REPORT).await,
            Indicator::ConsumerGoodsRetail => self.eastmoney_report(&RETAIL_REPORT).await,
        }
    }

    /// 商务数据中心-社会融资规模增量
    pub async fn social_financing(&self) -> Result<Table, MacroDataError> {
        let url = format!(
            "{}/datamofcom/front/gnmy/shrzgmQuery",
            self.config.mofcom_base.trim_end_matches('/')
        );
        let body = self.send_json(self.http.post(&url), &url).await?;
        let records = body
            .as_array()
            .ok_or_else(|| MacroDataError::parse("社会融资规模响应不是数组"))?;

        let mut table = Table::from_records(records, SOCIAL_FINANCING_COLUMNS)?;
        table.sort_by_column("月份");
        Ok(table)
    }

    /// 金十数据中心-中国 GDP 年率报告
    ///
    /// 历史数据来自 CDN 上的 JS 报表，近期数据来自 list_v2 接口；两者合并后
    /// 去空、按日期排序、同日期保留先出现的一条。
    pub async fn gdp_yearly(&self) -> Result<Table, MacroDataError> {
        let now_ms = chrono::Utc::now().timestamp_millis();

        let js_url = format!(
            "{}/dc/reports/dc_chinese_gdp_yoy_all.js",
            self.config.jin10_cdn_base.trim_end_matches('/')
        );
        let request = self
            .http
            .get(&js_url)
            .query(&[("v", now_ms.to_string()), ("_", (now_ms + 90).to_string())]);
        let js_text = self.send_text(request, &js_url).await?;
        let mut points = parse_jin10_report(&js_text)?;

        let api_url = format!(
            "{}/reports/list_v2",
            self.config.jin10_api_base.trim_end_matches('/')
        );
        let request = self
            .http
            .get(&api_url)
            .query(&[
                ("max_date", String::new()),
                ("category", "ec".to_string()),
                ("attr_id", "57".to_string()),
                ("_", now_ms.to_string()),
            ])
            .headers(jin10_headers());
        let body = self.send_json(request, &api_url).await?;
        points.extend(parse_jin10_values(&body)?);

        let mut table = Table::new(vec!["date".to_string(), "value".to_string()]);
        for (date, value) in points {
            let cell = convert_value(&value, "value", ColumnKind::Strict)?;
            table.push_row(vec![Cell::Text(date.format("%Y-%m-%d").to_string()), cell])?;
        }
        table.drop_null_rows();
        table.sort_by_column("date");
        table.dedup_by_column("date");
        Ok(table)
    }

    /// 东方财富数据中心通用报表
    pub async fn eastmoney_report(&self, report: &EastmoneyReport) -> Result<Table, MacroDataError> {
        let url = format!(
            "{}/api/data/v1/get",
            self.config.eastmoney_base.trim_end_matches('/')
        );
        let page_size = report.page_size.to_string();
        let columns = report.request_columns();
        let params: [(&str, &str); 12] = [
            ("columns", &columns),
            ("pageNumber", "1"),
            ("pageSize", &page_size),
            ("sortColumns", "REPORT_DATE"),
            ("sortTypes", "-1"),
            ("source", "WEB"),
            ("client", "WEB"),
            ("reportName", report.report_name),
            ("p", "1"),
            ("pageNo", "1"),
            ("pageNum", "1"),
            ("_", report.cache_buster),
        ];
        let mut request = self.http.get(&url).query(&params);
        if report.browser_user_agent {
            request = request.header(reqwest::header::USER_AGENT, BROWSER_UA);
        }

        let body = self.send_json(request, &url).await?;
        let records = body
            .pointer("/result/data")
            .and_then(Value::as_array)
            .ok_or_else(|| MacroDataError::missing_field("result.data"))?;
        Table::from_records(records, report.columns)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, MacroDataError> {
        tracing::debug!(url, "请求宏观数据");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MacroDataError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder, url: &str) -> Result<Value, MacroDataError> {
        let text = self.send_text(request, url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_text(&self, request: RequestBuilder, url: &str) -> Result<String, MacroDataError> {
        Ok(self.send(request, url).await?.text().await?)
    }
}

fn jin10_headers() -> HeaderMap {
    let pairs = [
        ("accept", "*/*"),
        ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"),
        ("cache-control", "no-cache"),
        ("origin", "https://datacenter.jin10.com"),
        ("pragma", "no-cache"),
        (
            "referer",
            "https://datacenter.jin10.com/reportType/dc_usa_michigan_consumer_sentiment",
        ),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-site"),
        ("user-agent", JIN10_UA),
        ("x-app-id", "rU6QIu7JHe2gOUeR"),
        ("x-csrf-token", ""),
        ("x-version", "1.0.0"),
    ];
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
}

/// 解析 `2011-01-20` 或 `2011-01-20 10:00:00` 形式的日期
fn parse_date(raw: &str) -> Result<NaiveDate, MacroDataError> {
    let day: String = raw.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .map_err(|e| MacroDataError::parse(format!("日期 {} 无法解析: {}", raw, e)))
}

/// 解析金十 JS 报表：取第一个 `{` 到最后一个 `}` 之间的 JSON
pub fn parse_jin10_report(text: &str) -> Result<Vec<(NaiveDate, Value)>, MacroDataError> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => return Err(MacroDataError::parse("金十报表中没有 JSON 对象")),
    };
    let json: Value = serde_json::from_str(text.get(start..=end).unwrap_or_default())?;

    let kinds = json
        .get("kinds")
        .and_then(Value::as_array)
        .ok_or_else(|| MacroDataError::missing_field("kinds"))?;
    let value_idx = kinds
        .iter()
        .position(|k| k.as_str() == Some(GDP_VALUE_KIND))
        .ok_or_else(|| MacroDataError::missing_field(format!("kinds.{}", GDP_VALUE_KIND)))?;

    let list = json
        .get("list")
        .and_then(Value::as_array)
        .ok_or_else(|| MacroDataError::missing_field("list"))?;

    list.iter()
        .map(|item| {
            let date = item
                .get("date")
                .and_then(Value::as_str)
                .ok_or_else(|| MacroDataError::missing_field("list[].date"))?;
            let value = item
                .get("datas")
                .and_then(|d| d.get(GDP_REPORT_KEY))
                .and_then(Value::as_array)
                .and_then(|values| values.get(value_idx))
                .cloned()
                .unwrap_or(Value::Null);
            Ok((parse_date(date)?, value))
        })
        .collect()
}

/// 解析金十 list_v2 接口：`data.values` 每行前两列为日期和值
pub fn parse_jin10_values(body: &Value) -> Result<Vec<(NaiveDate, Value)>, MacroDataError> {
    let values = body
        .pointer("/data/values")
        .and_then(Value::as_array)
        .ok_or_else(|| MacroDataError::missing_field("data.values"))?;

    values
        .iter()
        .map(|row| {
            let row = row
                .as_array()
                .ok_or_else(|| MacroDataError::parse("data.values 行不是数组"))?;
            let date = row
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| MacroDataError::missing_field("data.values[][0]"))?;
            let value = row.get(1).cloned().unwrap_or(Value::Null);
            Ok((parse_date(date)?, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_jin10_report() {
        let text = r#"var dc_chinese_gdp_yoy_all = {"kinds":["今值(%)","预测值(%)","前值(%)"],"list":[{"date":"2011-01-20","datas":{"中国GDP年率报告":[9.8,9.2,9.6]}},{"date":"2011-04-15","datas":{"中国GDP年率报告":[null,9.4,9.8]}}]};"#;
        let points = parse_jin10_report(text).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].0, NaiveDate::from_ymd_opt(2011, 1, 20).unwrap());
        assert_eq!(points[0].1, json!(9.8));
        assert_eq!(points[1].1, Value::Null);
    }

    #[test]
    fn test_parse_jin10_report_without_json() {
        assert!(parse_jin10_report("not a report").is_err());
        assert!(parse_jin10_report("} reversed {").is_err());
    }

    #[test]
    fn test_parse_jin10_report_missing_value_kind() {
        let text = r#"{"kinds":["预测值(%)"],"list":[]}"#;
        assert!(matches!(
            parse_jin10_report(text),
            Err(MacroDataError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_jin10_values() {
        let body = json!({"data": {"values": [["2024-01-17 10:00:00", "5.2", "5.3"], ["2023-10-18", 4.9]]}});
        let points = parse_jin10_values(&body).unwrap();
        assert_eq!(points[0].0, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(points[0].1, json!("5.2"));
        assert_eq!(points[1].1, json!(4.9));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("20240117").is_err());
    }

    #[test]
    fn test_jin10_headers() {
        let headers = jin10_headers();
        assert_eq!(headers["x-app-id"], "rU6QIu7JHe2gOUeR");
        assert_eq!(headers["x-csrf-token"], "");
    }
}
