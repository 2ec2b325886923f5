//! 快照分页器（页码）
//!
//! 默认不做计数：总数以哨兵值 `u64::MAX` 代替，避免每次请求的全表 COUNT。
//! 页面切片来自缓存的标识符快照，只对当前页的标识符发起一次存储查询。

use std::fmt;
use std::sync::Arc;

use super::{QuerySignature, RecordSource, SnapshotStore, reorder};
use shared::error::{AppError, AppResult};

/// 未计数时使用的总数哨兵
pub const UNCOUNTED_TOTAL: u64 = u64::MAX;

const NOT_AN_INTEGER: &str = "That page number is not an integer";
const LESS_THAN_ONE: &str = "That page number is less than 1";
const NO_RESULTS: &str = "That page contains no results";

/// 页码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNumber {
    Number(i64),
    /// 最后一页
    Last,
}

impl PageNumber {
    /// 解析页码文本（整数或 `last`）
    pub fn parse(text: &str) -> AppResult<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("last") {
            return Ok(Self::Last);
        }
        text.parse::<i64>()
            .map(Self::Number)
            .map_err(|_| AppError::invalid_page(text, NOT_AN_INTEGER))
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageNumber::Number(n) => write!(f, "{}", n),
            PageNumber::Last => f.write_str("last"),
        }
    }
}

/// 分页请求
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub number: PageNumber,
    pub page_size: usize,
    /// 是否返回（缓存的）真实总数
    pub show_count: bool,
}

impl PageRequest {
    pub fn new(number: i64, page_size: usize) -> Self {
        Self {
            number: PageNumber::Number(number),
            page_size,
            show_count: false,
        }
    }

    pub fn with_count(mut self) -> Self {
        self.show_count = true;
        self
    }
}

/// 一页数据
#[derive(Debug, Clone)]
pub struct Page<R> {
    /// 页码（从 1 开始）
    pub number: u64,
    pub items: Vec<R>,
    pub has_next: bool,
    pub has_previous: bool,
    /// 仅在 `show_count` 时存在
    pub count: Option<u64>,
    pub page_size: usize,
    /// 可计算的页数（未计数时以快照长度为界）
    pub num_pages: u64,
}

impl<R> Page<R> {
    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous.then(|| self.number - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Page<T> {
        Page {
            number: self.number,
            items: self.items.into_iter().map(f).collect(),
            has_next: self.has_next,
            has_previous: self.has_previous,
            count: self.count,
            page_size: self.page_size,
            num_pages: self.num_pages,
        }
    }
}

/// 页码分页器
pub struct SnapshotPaginator<S: RecordSource + ?Sized> {
    source: Arc<S>,
    snapshots: SnapshotStore,
    orphans: usize,
}

impl<S: RecordSource + ?Sized> SnapshotPaginator<S> {
    pub fn new(source: Arc<S>, snapshots: SnapshotStore) -> Self {
        Self {
            source,
            snapshots,
            orphans: 0,
        }
    }

    /// 末页孤儿容忍量：末页不足该数量时并入前一页
    pub fn with_orphans(mut self, orphans: usize) -> Self {
        self.orphans = orphans;
        self
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub async fn paginate(
        &self,
        query: &QuerySignature,
        request: PageRequest,
    ) -> AppResult<Page<S::Record>> {
        if request.page_size == 0 {
            return Err(AppError::validation("Page size must be greater than 0"));
        }
        let size = request.page_size as u64;
        let orphans = self.orphans as u64;

        let total = if request.show_count {
            self.snapshots.count(self.source.as_ref(), query).await?
        } else {
            UNCOUNTED_TOTAL
        };
        let ids = self
            .snapshots
            .identifiers(self.source.as_ref(), query)
            .await?;

        // 真实总数可能已落后于快照，哨兵总数则远超快照
        let bound = total.min(ids.len() as u64);
        let num_pages = bound.saturating_sub(orphans).max(1).div_ceil(size);

        let number = match request.number {
            PageNumber::Last => num_pages,
            PageNumber::Number(n) if n < 1 => {
                return Err(AppError::invalid_page(n.to_string(), LESS_THAN_ONE));
            }
            PageNumber::Number(n) => n as u64,
        };
        if number > num_pages {
            return Err(AppError::invalid_page(number.to_string(), NO_RESULTS));
        }

        let bottom = (number - 1) * size;
        let mut top = bottom.saturating_add(size);
        if top.saturating_add(orphans) >= bound {
            top = bound;
        }

        let slice = &ids[bottom as usize..top as usize];
        let records = self.source.fetch_by_identifiers(query, slice).await?;
        let items = reorder(slice, records);

        let has_next = !items.is_empty() && top < bound;
        tracing::debug!(
            query = %query,
            page = number,
            items = items.len(),
            has_next,
            "Materialized page"
        );

        Ok(Page {
            number,
            items,
            has_next,
            has_previous: number > 1,
            count: request.show_count.then_some(total),
            page_size: request.page_size,
            num_pages,
        })
    }
}
