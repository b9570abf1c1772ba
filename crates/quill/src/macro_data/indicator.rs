//! 指标目录：每个指标的工具名、描述和列映射

use super::table::{ColumnKind, ColumnSpec};

use ColumnKind::{Coerce, Strict, Text};

/// 可抓取的宏观指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    SocialFinancing,
    GdpYearly,
    Cpi,
    Ppi,
    MoneySupply,
    ConsumerGoodsRetail,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::SocialFinancing,
        Indicator::GdpYearly,
        Indicator::Cpi,
        Indicator::Ppi,
        Indicator::MoneySupply,
        Indicator::ConsumerGoodsRetail,
    ];

    /// 工具名
    pub fn name(&self) -> &'static str {
        match self {
            Indicator::SocialFinancing => "macro_china_shrzgm",
            Indicator::GdpYearly => "macro_china_gdp_yearly",
            Indicator::Cpi => "macro_china_cpi",
            Indicator::Ppi => "macro_china_ppi",
            Indicator::MoneySupply => "macro_china_money_supply",
            Indicator::ConsumerGoodsRetail => "macro_china_consumer_goods_retail",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Indicator::SocialFinancing => "商务数据中心-国内贸易-社会融资规模增量统计",
            Indicator::GdpYearly => {
                "金十数据中心-中国 GDP 年率报告, 数据区间从 20110120-至今, 返回 date 和 value 两列"
            }
            Indicator::Cpi => "东方财富-中国居民消费价格指数, 包含全国、城市、农村的当月值、同比、环比和累计",
            Indicator::Ppi => "东方财富-中国工业品出厂价格指数",
            Indicator::MoneySupply => "东方财富-货币供应量, 包含 M2、M1、M0 的数量、同比和环比",
            Indicator::ConsumerGoodsRetail => "东方财富-经济数据-社会消费品零售总额",
        }
    }

    pub fn from_name(name: &str) -> Option<Indicator> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }
}

/// 东方财富报表定义
#[derive(Debug, Clone, Copy)]
pub struct EastmoneyReport {
    pub report_name: &'static str,
    pub page_size: u32,
    /// 请求参数 `_` 的固定值
    pub cache_buster: &'static str,
    /// 是否携带浏览器 UA
    pub browser_user_agent: bool,
    /// 输出列（不含被丢弃的 REPORT_DATE）
    pub columns: &'static [ColumnSpec],
}

impl EastmoneyReport {
    /// 请求参数 `columns`：REPORT_DATE 加上所有输出列的源字段
    pub fn request_columns(&self) -> String {
        let mut keys = vec!["REPORT_DATE"];
        keys.extend(self.columns.iter().filter_map(|c| match c.source {
            super::table::ColumnSource::Key(k) => Some(k),
            super::table::ColumnSource::Position(_) => None,
        }));
        keys.join(",")
    }
}

pub const CPI_REPORT: EastmoneyReport = EastmoneyReport {
    report_name: "RPT_ECONOMY_CPI",
    page_size: 2000,
    cache_buster: "1669047266881",
    browser_user_agent: false,
    columns: &[
        ColumnSpec::key("TIME", "月份", Text),
        ColumnSpec::key("NATIONAL_BASE", "全国-当月", Coerce),
        ColumnSpec::key("NATIONAL_SAME", "全国-同比增长", Coerce),
        ColumnSpec::key("NATIONAL_SEQUENTIAL", "全国-环比增长", Coerce),
        ColumnSpec::key("NATIONAL_ACCUMULATE", "全国-累计", Coerce),
        ColumnSpec::key("CITY_BASE", "城市-当月", Coerce),
        ColumnSpec::key("CITY_SAME", "城市-同比增长", Coerce),
        ColumnSpec::key("CITY_SEQUENTIAL", "城市-环比增长", Coerce),
        ColumnSpec::key("CITY_ACCUMULATE", "城市-累计", Coerce),
        ColumnSpec::key("RURAL_BASE", "农村-当月", Coerce),
        ColumnSpec::key("RURAL_SAME", "农村-同比增长", Coerce),
        ColumnSpec::key("RURAL_SEQUENTIAL", "农村-环比增长", Coerce),
        ColumnSpec::key("RURAL_ACCUMULATE", "农村-累计", Coerce),
    ],
};

pub const PPI_REPORT: EastmoneyReport = EastmoneyReport {
    report_name: "RPT_ECONOMY_PPI",
    page_size: 2000,
    cache_buster: "1669047266881",
    browser_user_agent: false,
    columns: &[
        ColumnSpec::key("TIME", "月份", Text),
        ColumnSpec::key("BASE", "当月", Coerce),
        ColumnSpec::key("BASE_SAME", "当月同比增长", Coerce),
        ColumnSpec::key("BASE_ACCUMULATE", "累计", Coerce),
    ],
};

pub const MONEY_SUPPLY_REPORT: EastmoneyReport = EastmoneyReport {
    report_name: "RPT_ECONOMY_CURRENCY_SUPPLY",
    page_size: 2000,
    cache_buster: "1669047266881",
    browser_user_agent: false,
    columns: &[
        ColumnSpec::key("TIME", "月份", Text),
        ColumnSpec::key("BASIC_CURRENCY", "货币和准货币(M2)-数量(亿元)", Strict),
        ColumnSpec::key("BASIC_CURRENCY_SAME", "货币和准货币(M2)-同比增长", Strict),
        ColumnSpec::key("BASIC_CURRENCY_SEQUENTIAL", "货币和准货币(M2)-环比增长", Strict),
        ColumnSpec::key("CURRENCY", "货币(M1)-数量(亿元)", Strict),
        ColumnSpec::key("CURRENCY_SAME", "货币(M1)-同比增长", Strict),
        ColumnSpec::key("CURRENCY_SEQUENTIAL", "货币(M1)-环比增长", Strict),
        ColumnSpec::key("FREE_CASH", "流通中的现金(M0)-数量(亿元)", Strict),
        ColumnSpec::key("FREE_CASH_SAME", "流通中的现金(M0)-同比增长", Strict),
        ColumnSpec::key("FREE_CASH_SEQUENTIAL", "流通中的现金(M0)-环比增长", Strict),
    ],
};

pub const RETAIL_REPORT: EastmoneyReport = EastmoneyReport {
    report_name: "RPT_ECONOMY_TOTAL_RETAIL",
    page_size: 1000,
    cache_buster: "1660718498421",
    browser_user_agent: true,
    columns: &[
        ColumnSpec::key("TIME", "月份", Text),
        ColumnSpec::key("RETAIL_TOTAL", "当月", Coerce),
        ColumnSpec::key("RETAIL_TOTAL_SAME", "同比增长", Coerce),
        ColumnSpec::key("RETAIL_TOTAL_SEQUENTIAL", "环比增长", Coerce),
        ColumnSpec::key("RETAIL_TOTAL_ACCUMULATE", "累计", Coerce),
        ColumnSpec::key("RETAIL_ACCUMULATE_SAME", "累计-同比增长", Coerce),
    ],
};

/// 社会融资规模增量：商务部接口字段名不稳定，按位置映射
///
/// 响应字段顺序：月份、未贴现银行承兑汇票、委托贷款、委托贷款外币贷款、人民币贷款、
/// 企业债券、社会融资规模增量、非金融企业境内股票融资、信托贷款。
pub const SOCIAL_FINANCING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::nth(0, "月份", Text),
    ColumnSpec::nth(6, "社会融资规模增量", Coerce),
    ColumnSpec::nth(4, "其中-人民币贷款", Coerce),
    ColumnSpec::nth(3, "其中-委托贷款外币贷款", Coerce),
    ColumnSpec::nth(2, "其中-委托贷款", Coerce),
    ColumnSpec::nth(8, "其中-信托贷款", Coerce),
    ColumnSpec::nth(1, "其中-未贴现银行承兑汇票", Coerce),
    ColumnSpec::nth(5, "其中-企业债券", Coerce),
    ColumnSpec::nth(7, "其中-非金融企业境内股票融资", Coerce),
];
