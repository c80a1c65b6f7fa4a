//! 解析参数
//!
//! 调用方提供的覆盖参数，优先于注册信息自行解析的依赖

use crate::resolver::{downcast_instance, ComponentContext, Instance, ResolveExt};
use crate::service::ServiceKey;
use infrastructure_common::{DependencyError, TypeInfo};
use std::sync::Arc;

/// 单个覆盖参数
#[derive(Debug, Clone)]
pub enum Parameter {
    /// 按名称匹配
    Named { name: String, value: Instance },
    /// 按类型匹配
    Typed { type_info: TypeInfo, value: Instance },
    /// 按位置匹配
    Positional { position: usize, value: Instance },
}

impl Parameter {
    /// 创建命名参数
    pub fn named<T: Send + Sync + 'static>(name: impl Into<String>, value: T) -> Self {
        Self::Named {
            name: name.into(),
            value: Arc::new(value),
        }
    }

    /// 创建类型参数
    pub fn typed<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Typed {
            type_info: TypeInfo::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// 使用已有的共享实例创建类型参数
    pub fn typed_shared<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::Typed {
            type_info: TypeInfo::of::<T>(),
            value,
        }
    }

    /// 创建位置参数
    pub fn positional<T: Send + Sync + 'static>(position: usize, value: T) -> Self {
        Self::Positional {
            position,
            value: Arc::new(value),
        }
    }

    fn value(&self) -> &Instance {
        match self {
            Self::Named { value, .. } | Self::Typed { value, .. } | Self::Positional { value, .. } => value,
        }
    }
}

/// 有序的参数集合
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    items: Vec<Parameter>,
}

impl Parameters {
    /// 创建空参数集合
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// 添加参数
    pub fn with(mut self, parameter: Parameter) -> Self {
        self.items.push(parameter);
        self
    }

    /// 追加参数
    pub fn push(&mut self, parameter: Parameter) {
        self.items.push(parameter);
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 遍历参数
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.items.iter()
    }

    /// 查找命名参数，名称匹配但类型不符时返回 `None`
    pub fn named<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.items.iter().find_map(|parameter| match parameter {
            Parameter::Named { name: candidate, value } if candidate == name => {
                value.clone().downcast::<T>().ok()
            }
            _ => None,
        })
    }

    /// 查找类型参数
    pub fn typed<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.items.iter().find_map(|parameter| match parameter {
            Parameter::Typed { type_info, value } if type_info.is::<T>() => {
                value.clone().downcast::<T>().ok()
            }
            _ => None,
        })
    }

    /// 查找位置参数
    pub fn positional<T: Send + Sync + 'static>(&self, position: usize) -> Option<Arc<T>> {
        self.items.iter().find_map(|parameter| match parameter {
            Parameter::Positional { position: candidate, value } if *candidate == position => {
                value.clone().downcast::<T>().ok()
            }
            _ => None,
        })
    }

    /// 获取必需的命名参数
    pub fn required_named<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, DependencyError> {
        let service = ServiceKey::named::<T>(name);
        match self.items.iter().find(|parameter| {
            matches!(parameter, Parameter::Named { name: candidate, .. } if candidate == name)
        }) {
            Some(parameter) => downcast_instance(&service, parameter.value().clone()),
            None => Err(DependencyError::resolution_failed(
                service,
                format!("缺少必需的命名参数 '{}'", name),
            )),
        }
    }

    /// 优先使用类型参数，否则从上下文解析
    pub fn typed_or_resolve<T, C>(&self, context: &C) -> Result<Arc<T>, DependencyError>
    where
        T: Send + Sync + 'static,
        C: ComponentContext + ?Sized,
    {
        match self.typed::<T>() {
            Some(value) => Ok(value),
            None => context.resolve::<T>(),
        }
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Parameter>> for Parameters {
    fn from(items: Vec<Parameter>) -> Self {
        Self { items }
    }
}
