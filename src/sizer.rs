// src/sizer.rs — 由模块数和目标尺寸计算每模块像素数

use crate::error::{Error, Result};
use crate::types::{QrRenderPlan, Size};

/// 计算渲染计划
///
/// - 请求尺寸宽高任一小于最小尺寸时，整体换成最小尺寸
/// - 只用宽度决定缩放，高度视为同一正方形
/// - 每模块像素数向上取整，最终边长可能略大于目标，调用方应接受而不是再缩放
pub fn plan(module_count: u32, requested: Size, minimum: Size) -> Result<QrRenderPlan> {
    if module_count < 1 {
        return Err(Error::InvalidModuleCount(module_count));
    }

    let effective = if requested.covers(&minimum) {
        requested
    } else {
        log::debug!("请求尺寸 {requested} 小于最小值 {minimum}，改用最小值");
        minimum
    };

    let pixels_per_module = effective.width.div_ceil(module_count).max(1);
    let final_pixel_size = pixels_per_module.saturating_mul(module_count);

    Ok(QrRenderPlan {
        module_count,
        target_pixel_size: effective.width,
        pixels_per_module,
        final_pixel_size,
    })
}
