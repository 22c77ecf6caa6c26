//! Canned articles served while no live news source is configured.

use chrono::{DateTime, Duration, Utc};

use super::news_model::{Article, NewsType};
use super::news_traits::NewsProvider;

struct CatalogEntry {
    title: &'static str,
    description: &'static str,
    source: &'static str,
    url: &'static str,
    days_ago: i64,
}

const STOCK_CATALOG: [CatalogEntry; 8] = [
    CatalogEntry {
        title: "Indian Market Hits New Heights in December Trading",
        description: "Sensex and Nifty50 show strong performance amid positive global trends.",
        source: "Market Watch",
        url: "https://www.bseindia.com",
        days_ago: 1,
    },
    CatalogEntry {
        title: "Tech Stocks Rally on AI Optimism",
        description: "Technology sector leads the market with strong Q4 earnings outlook.",
        source: "Financial Times",
        url: "https://www.ft.com",
        days_ago: 2,
    },
    CatalogEntry {
        title: "RBI Maintains Status Quo on Interest Rates",
        description: "Reserve Bank of India keeps repo rate unchanged at latest monetary policy review.",
        source: "Reuters",
        url: "https://www.reuters.com",
        days_ago: 3,
    },
    CatalogEntry {
        title: "Banking Sector Shows Strong Fundamentals",
        description: "Major Indian banks report improved asset quality and margins in latest quarter.",
        source: "Bloomberg",
        url: "https://www.bloomberg.com",
        days_ago: 4,
    },
    CatalogEntry {
        title: "FMCG Companies Report Robust Sales Growth",
        description: "Sector performance outpaces market expectations with strong domestic demand.",
        source: "BSE India",
        url: "https://www.bseindia.com",
        days_ago: 5,
    },
    CatalogEntry {
        title: "Pharma Stocks Gain on Export Boost",
        description: "Indian pharmaceutical exports surge amid global demand recovery.",
        source: "Stock Exchange",
        url: "https://www.nseindia.com",
        days_ago: 6,
    },
    CatalogEntry {
        title: "Infrastructure Investment Shows Growth Momentum",
        description: "Government spending on infrastructure drives major index components higher.",
        source: "Economic Times",
        url: "https://www.economictimes.com",
        days_ago: 7,
    },
    CatalogEntry {
        title: "Market Ready for Year-End Portfolio Rebalancing",
        description: "Analysts expect typical year-end trading patterns with sector rotation.",
        source: "Moneycontrol",
        url: "https://www.moneycontrol.com",
        days_ago: 8,
    },
];

const CRYPTO_CATALOG: [CatalogEntry; 8] = [
    CatalogEntry {
        title: "Bitcoin Approaches Key Resistance Level",
        description: "Major cryptocurrency shows strength amid broader market recovery.",
        source: "CoinDesk",
        url: "https://www.coindesk.com",
        days_ago: 1,
    },
    CatalogEntry {
        title: "Ethereum Network Processes Record Transactions",
        description: "Layer 2 solutions boost Ethereum throughput to all-time highs.",
        source: "Crypto Daily",
        url: "https://cryptodaily.co.uk",
        days_ago: 2,
    },
    CatalogEntry {
        title: "Global Crypto Regulations Take Shape in 2025",
        description: "Major economies finalize crypto regulatory frameworks.",
        source: "The Block",
        url: "https://www.theblockco.com",
        days_ago: 3,
    },
    CatalogEntry {
        title: "DeFi Protocols Report Increased Activity",
        description: "Decentralized finance sector shows sustained user growth and TVL expansion.",
        source: "Decrypt",
        url: "https://decrypt.co",
        days_ago: 4,
    },
    CatalogEntry {
        title: "Institutional Investors Increase Crypto Holdings",
        description: "Pension funds and major institutions add digital assets to portfolios.",
        source: "CoinTelegraph",
        url: "https://cointelegraph.com",
        days_ago: 5,
    },
    CatalogEntry {
        title: "Bitcoin Mining Becomes More Efficient",
        description: "New hardware and energy solutions improve mining profitability.",
        source: "Crypto News",
        url: "https://cryptonews.com",
        days_ago: 6,
    },
    CatalogEntry {
        title: "Altcoins Show Signs of Recovery",
        description: "Alternative cryptocurrencies outperform following sector rotation.",
        source: "Bitcoin Magazine",
        url: "https://bitcoinmagazine.com",
        days_ago: 7,
    },
    CatalogEntry {
        title: "NFT Market Stabilizes with Real-World Use Cases",
        description: "Non-fungible tokens find adoption in enterprise and gaming sectors.",
        source: "NFT Now",
        url: "https://nftnow.com",
        days_ago: 8,
    },
];

/// [`NewsProvider`] over a fixed, compiled-in catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticNewsProvider;

impl NewsProvider for StaticNewsProvider {
    fn articles(&self, news_type: NewsType, now: DateTime<Utc>) -> Vec<Article> {
        let catalog: &[CatalogEntry] = match news_type {
            NewsType::Stock => &STOCK_CATALOG,
            NewsType::Crypto => &CRYPTO_CATALOG,
        };
        catalog
            .iter()
            .map(|entry| Article {
                title: entry.title.to_string(),
                description: entry.description.to_string(),
                source: entry.source.to_string(),
                published: now - Duration::days(entry.days_ago),
                url: entry.url.to_string(),
                image: None,
            })
            .collect()
    }
}
