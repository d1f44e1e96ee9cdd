use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::activities::model::{
    Activity, CreateActivityDto, PaginatedActivitiesResponse, UpdateActivityDto,
};
use crate::modules::announcements::model::{
    Announcement, CreateAnnouncementDto, PaginatedAnnouncementsResponse, UpdateAnnouncementDto,
};
use crate::modules::auth::model::{
    AuthResponse, ChangePasswordRequest, Claims, ErrorResponse, LoginRequest, MessageResponse,
    RefreshResponse, RefreshTokenRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::modules::canteen::model::{CanteenMenu, CreateCanteenMenuDto, UpdateCanteenMenuDto};
use crate::modules::children::model::{
    Child, ChildDetails, CreateChildDto, LinkParentDto, LinkTeacherDto, LinkedAccount,
    PaginatedChildrenResponse, UpdateChildDto,
};
use crate::modules::liaison::model::{CreateLiaisonEntryDto, LiaisonEntry};
use crate::modules::report_cards::model::{
    CreateReportCardDto, ReportCard, UpdateReportCardDto,
};
use crate::modules::schools::model::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolInfo, UpdateSchoolDto,
};
use crate::modules::timetables::model::{
    CreateTimetableEntryDto, TimetableEntry, UpdateTimetableEntryDto,
};
use crate::modules::users::model::{
    AssignRoleDto, CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserResponse,
    UserRole,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::update_profile,
        crate::modules::auth::controller::change_password,
        crate::modules::auth::controller::delete_account,
        crate::modules::schools::controller::create_school,
        crate::modules::schools::controller::get_all_schools,
        crate::modules::schools::controller::get_school,
        crate::modules::schools::controller::update_school,
        crate::modules::schools::controller::delete_school,
        crate::modules::schools::controller::toggle_school_status,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_users_by_role,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::assign_role,
        crate::modules::users::controller::remove_role,
        crate::modules::children::controller::create_child,
        crate::modules::children::controller::get_children,
        crate::modules::children::controller::get_my_children,
        crate::modules::children::controller::get_child,
        crate::modules::children::controller::update_child,
        crate::modules::children::controller::delete_child,
        crate::modules::children::controller::link_parent,
        crate::modules::children::controller::unlink_parent,
        crate::modules::children::controller::link_teacher,
        crate::modules::children::controller::unlink_teacher,
        crate::modules::announcements::controller::create_announcement,
        crate::modules::announcements::controller::get_announcements,
        crate::modules::announcements::controller::get_announcement,
        crate::modules::announcements::controller::update_announcement,
        crate::modules::announcements::controller::delete_announcement,
        crate::modules::activities::controller::create_activity,
        crate::modules::activities::controller::get_activities,
        crate::modules::activities::controller::get_activity,
        crate::modules::activities::controller::update_activity,
        crate::modules::activities::controller::delete_activity,
        crate::modules::report_cards::controller::create_report_card,
        crate::modules::report_cards::controller::get_report_cards_for_child,
        crate::modules::report_cards::controller::get_report_card,
        crate::modules::report_cards::controller::update_report_card,
        crate::modules::report_cards::controller::delete_report_card,
        crate::modules::liaison::controller::create_entry,
        crate::modules::liaison::controller::get_entries_for_child,
        crate::modules::liaison::controller::get_entry,
        crate::modules::liaison::controller::acknowledge_entry,
        crate::modules::liaison::controller::delete_entry,
        crate::modules::canteen::controller::create_menu,
        crate::modules::canteen::controller::get_menus,
        crate::modules::canteen::controller::get_menu,
        crate::modules::canteen::controller::update_menu,
        crate::modules::canteen::controller::delete_menu,
        crate::modules::timetables::controller::create_entry,
        crate::modules::timetables::controller::get_entries,
        crate::modules::timetables::controller::get_entry,
        crate::modules::timetables::controller::update_entry,
        crate::modules::timetables::controller::delete_entry,
    ),
    components(
        schemas(
            Claims,
            ErrorResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            AuthResponse,
            RefreshResponse,
            School,
            SchoolInfo,
            CreateSchoolDto,
            UpdateSchoolDto,
            PaginatedSchoolsResponse,
            User,
            UserRole,
            UserResponse,
            CreateUserDto,
            UpdateUserDto,
            AssignRoleDto,
            PaginatedUsersResponse,
            Child,
            ChildDetails,
            LinkedAccount,
            CreateChildDto,
            UpdateChildDto,
            LinkParentDto,
            LinkTeacherDto,
            PaginatedChildrenResponse,
            Announcement,
            CreateAnnouncementDto,
            UpdateAnnouncementDto,
            PaginatedAnnouncementsResponse,
            Activity,
            CreateActivityDto,
            UpdateActivityDto,
            PaginatedActivitiesResponse,
            ReportCard,
            CreateReportCardDto,
            UpdateReportCardDto,
            LiaisonEntry,
            CreateLiaisonEntryDto,
            CanteenMenu,
            CreateCanteenMenuDto,
            UpdateCanteenMenuDto,
            TimetableEntry,
            CreateTimetableEntryDto,
            UpdateTimetableEntryDto,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration, login and token management"),
        (name = "Schools", description = "School (tenant) directory"),
        (name = "Users", description = "Account administration and role management"),
        (name = "Children", description = "Child records and parent/teacher links"),
        (name = "Announcements", description = "School announcements"),
        (name = "Activities", description = "School activities and events"),
        (name = "Report cards", description = "Report cards (bulletins)"),
        (name = "Liaison book", description = "Parent-teacher liaison book"),
        (name = "Canteen", description = "Canteen menus"),
        (name = "Timetables", description = "Class timetables")
    ),
    info(
        title = "Scolaris API",
        version = "0.1.0",
        description = "Multi-tenant school management REST API built with Rust, Axum and PostgreSQL.",
        contact(
            name = "API Support",
            email = "support@scolaris.io"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
