//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 金额（套餐价格、账单金额）
///
/// 后端可能以字符串形式返回数值，归一化后统一为有限且非负的 `f64`。
///
/// # 示例
///
/// ```
/// use signage_domain::value_object::Price;
///
/// let p = Price::new(39.99).unwrap();
/// assert_eq!(p.value(), 39.99);
/// assert!(Price::new(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// 创建并校验金额
    pub fn new(value: f64) -> DomainResult<Self> {
        let price = Self(value);
        price.validate()?;
        Ok(price)
    }

    pub const fn zero() -> Self {
        Self(0.0)
    }

    pub const fn value(&self) -> f64 {
        self.0
    }

    /// 按金额升序比较（NaN 已在校验中排除）
    pub fn cmp_value(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl ValueObject for Price {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if !self.0.is_finite() {
            return Err(DomainError::invalid_value(format!(
                "price must be finite, got {}",
                self.0
            )));
        }
        if self.0 < 0.0 {
            return Err(DomainError::invalid_value(format!(
                "price must be >= 0, got {}",
                self.0
            )));
        }
        Ok(())
    }
}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
